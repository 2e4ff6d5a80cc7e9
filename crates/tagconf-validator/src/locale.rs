//! Message catalog for rule violations.
//!
//! Two locales are built in, English and Chinese. Without a locale a
//! violation is reported as its raw rule code with parameters, e.g.
//! `range(min=1024)`.

use std::fmt;

use validator::ValidationError;

/// Message locale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Locale {
    /// English.
    En,
    /// Simplified Chinese.
    Zh,
}

impl Locale {
    /// Parses a locale tag.
    ///
    /// An empty tag disables translation. Tags starting with `zh` select
    /// Chinese; every other tag falls back to English.
    ///
    /// # Example
    ///
    /// ```
    /// use tagconf_validator::Locale;
    ///
    /// assert_eq!(Locale::from_tag(""), None);
    /// assert_eq!(Locale::from_tag("zh-CN"), Some(Locale::Zh));
    /// assert_eq!(Locale::from_tag("fr"), Some(Locale::En));
    /// ```
    pub fn from_tag(tag: &str) -> Option<Self> {
        let tag = tag.trim();
        if tag.is_empty() {
            None
        } else if tag.to_ascii_lowercase().starts_with("zh") {
            Some(Locale::Zh)
        } else {
            Some(Locale::En)
        }
    }

    /// Short tag of the locale.
    pub const fn as_str(self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::Zh => "zh",
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Renders one violation of `field`.
///
/// A custom message set on the rule wins over the catalog when a locale is
/// selected.
pub fn render(locale: Option<Locale>, field: &str, error: &ValidationError) -> String {
    match locale {
        None => raw_code(error),
        Some(locale) => match &error.message {
            Some(message) => message.to_string(),
            None => match locale {
                Locale::En => english(field, error),
                Locale::Zh => chinese(field, error),
            },
        },
    }
}

/// Rule code with its parameters, sorted by name. The `value` parameter
/// added by the rule evaluator is left out.
pub fn raw_code(error: &ValidationError) -> String {
    let mut params: Vec<(String, String)> = error
        .params
        .iter()
        .filter(|(name, _)| *name != "value")
        .map(|(name, value)| (name.to_string(), param_text(value)))
        .collect();

    if params.is_empty() {
        return error.code.to_string();
    }

    params.sort();
    let params: Vec<String> = params
        .into_iter()
        .map(|(name, value)| format!("{name}={value}"))
        .collect();
    format!("{}({})", error.code, params.join(", "))
}

fn param_text<V: fmt::Display + ?Sized>(value: &V) -> String {
    let text = value.to_string();
    text.strip_prefix('"')
        .and_then(|t| t.strip_suffix('"'))
        .map(str::to_string)
        .unwrap_or(text)
}

fn param(error: &ValidationError, name: &str) -> Option<String> {
    error
        .params
        .iter()
        .find(|(key, _)| *key == name)
        .map(|(_, value)| param_text(value))
}

fn first_param(error: &ValidationError, names: &[&str]) -> String {
    names
        .iter()
        .find_map(|name| param(error, name))
        .unwrap_or_default()
}

fn english(field: &str, error: &ValidationError) -> String {
    let min = param(error, "min");
    let max = param(error, "max");

    match &*error.code {
        "required" => format!("{field} is a required field"),
        "length" => match (min, max, param(error, "equal")) {
            (_, _, Some(equal)) => format!("{field} must be {equal} characters in length"),
            (Some(min), Some(max), None) => {
                format!("{field} must be between {min} and {max} characters in length")
            }
            (Some(min), None, None) => {
                format!("{field} must be at least {min} characters in length")
            }
            (None, Some(max), None) => {
                format!("{field} must be a maximum of {max} characters in length")
            }
            (None, None, None) => format!("{field} has an invalid length"),
        },
        "range" => match (min, max) {
            (Some(min), Some(max)) => format!("{field} must be between {min} and {max}"),
            (Some(min), None) => format!("{field} must be {min} or greater"),
            (None, Some(max)) => format!("{field} must be {max} or less"),
            (None, None) => match (
                param(error, "exclusive_min"),
                param(error, "exclusive_max"),
            ) {
                (Some(min), _) => format!("{field} must be greater than {min}"),
                (None, Some(max)) => format!("{field} must be less than {max}"),
                (None, None) => format!("{field} is out of range"),
            },
        },
        "email" => format!("{field} must be a valid email address"),
        "url" => format!("{field} must be a valid URL"),
        "ip" | "ipv4" | "ipv6" => format!("{field} must be a valid IP address"),
        "contains" => format!(
            "{field} must contain the text '{}'",
            first_param(error, &["pattern", "needle"])
        ),
        "does_not_contain" => format!(
            "{field} cannot contain the text '{}'",
            first_param(error, &["pattern", "needle"])
        ),
        "must_match" => format!("{field} must be equal to {}", first_param(error, &["other"])),
        "regex" => format!("{field} does not match the required format"),
        "credit_card" => format!("{field} must be a valid credit card number"),
        "non_control_character" => format!("{field} cannot contain control characters"),
        code => format!("{field} failed on the '{code}' rule"),
    }
}

fn chinese(field: &str, error: &ValidationError) -> String {
    let min = param(error, "min");
    let max = param(error, "max");

    match &*error.code {
        "required" => format!("{field}为必填字段"),
        "length" => match (min, max, param(error, "equal")) {
            (_, _, Some(equal)) => format!("{field}长度必须是{equal}个字符"),
            (Some(min), Some(max), None) => format!("{field}长度必须在{min}和{max}个字符之间"),
            (Some(min), None, None) => format!("{field}长度必须至少为{min}个字符"),
            (None, Some(max), None) => format!("{field}长度不能超过{max}个字符"),
            (None, None, None) => format!("{field}长度无效"),
        },
        "range" => match (min, max) {
            (Some(min), Some(max)) => format!("{field}必须在{min}和{max}之间"),
            (Some(min), None) => format!("{field}必须大于或等于{min}"),
            (None, Some(max)) => format!("{field}必须小于或等于{max}"),
            (None, None) => match (
                param(error, "exclusive_min"),
                param(error, "exclusive_max"),
            ) {
                (Some(min), _) => format!("{field}必须大于{min}"),
                (None, Some(max)) => format!("{field}必须小于{max}"),
                (None, None) => format!("{field}超出范围"),
            },
        },
        "email" => format!("{field}必须是一个有效的邮箱"),
        "url" => format!("{field}必须是一个有效的URL"),
        "ip" | "ipv4" | "ipv6" => format!("{field}必须是一个有效的IP地址"),
        "contains" => format!(
            "{field}必须包含文本'{}'",
            first_param(error, &["pattern", "needle"])
        ),
        "does_not_contain" => format!(
            "{field}不能包含文本'{}'",
            first_param(error, &["pattern", "needle"])
        ),
        "must_match" => format!("{field}必须等于{}", first_param(error, &["other"])),
        "regex" => format!("{field}格式不正确"),
        "credit_card" => format!("{field}必须是一个有效的信用卡号码"),
        "non_control_character" => format!("{field}不能包含控制字符"),
        code => format!("{field}未通过'{code}'校验"),
    }
}

use regex::Regex;

pub const DNS_952_MESSAGE: &str =
    "The name need to be a DNS 952 label ^[a-z]{1}[a-z0-9-]{1,23}$";

/// Names that end up as Kubernetes object names have to be DNS-952 labels.
pub fn is_dns_952_label(name: &str) -> bool {
    lazy_static! {
        static ref DNS_952: Regex = Regex::new(r"^[a-z]{1}[a-z0-9-]{1,23}$").unwrap();
    }
    DNS_952.is_match(name)
}

/// Blank JSON text fields are sent to the backend as an empty object.
pub fn json_or_empty_object(text: &str) -> String {
    if text.trim().is_empty() {
        "{}".to_string()
    } else {
        text.to_string()
    }
}

/// Browsers report `getTimezoneOffset()`, minutes *behind* UTC, so the sign
/// flips: an offset of -480 is UTC+8.
pub fn describe_time_zone(offset_minutes: i64) -> String {
    let hours = offset_minutes as f64 / 60.0;
    let sign = if offset_minutes <= 0 { "+" } else { "-" };
    format!("Browser time zone is {}{} from UTC", sign, hours.abs())
}

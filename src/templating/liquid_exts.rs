use liquid_core::Result;
use liquid_core::Runtime;
use liquid_core::{Display_filter, Filter, FilterReflection, ParseFilter};
use liquid_core::{Value, ValueView};
use serde_json::to_string_pretty;

#[derive(Clone, ParseFilter, FilterReflection)]
#[filter(
    name = "json",
    description = "Render the provided object into pretty-printed JSON.",
    parsed(JsonFilter)
)]
pub struct JsonFilterParser;

#[derive(Debug, Default, Display_filter)]
#[name = "json"]
struct JsonFilter;

impl Filter for JsonFilter {
    fn evaluate(&self, input: &dyn ValueView, _runtime: &dyn Runtime) -> Result<Value> {
        let s = to_string_pretty(&input.to_value()).unwrap_or_else(|_e| "".to_string());
        Ok(Value::scalar(s))
    }
}

#[derive(Clone, ParseFilter, FilterReflection)]
#[filter(
    name = "duration",
    description = "Render a nanosecond count the way Go prints a time.Duration, e.g. 1h2m3s.",
    parsed(DurationFilter)
)]
pub struct DurationFilterParser;

#[derive(Debug, Default, Display_filter)]
#[name = "duration"]
struct DurationFilter;

/// `whole.frac` with the fraction's trailing zeros trimmed; `frac` has
/// `digits` decimal places.
fn with_fraction(whole: u64, frac: u64, digits: usize) -> String {
    if frac == 0 {
        return whole.to_string();
    }
    let frac = format!("{:0width$}", frac, width = digits);
    format!("{}.{}", whole, frac.trim_end_matches('0'))
}

/// Same output as Go's `time.Duration.String()`: sub-second values use the
/// largest of ns/µs/ms that fits, longer ones are `[h][m]s` with fractional
/// seconds.
pub fn format_nanos(nanos: i64) -> String {
    if nanos == 0 {
        return "0s".to_string();
    }
    let sign = if nanos < 0 { "-" } else { "" };
    let u = nanos.unsigned_abs();

    let body = if u < 1_000 {
        format!("{}ns", u)
    } else if u < 1_000_000 {
        format!("{}µs", with_fraction(u / 1_000, u % 1_000, 3))
    } else if u < 1_000_000_000 {
        format!("{}ms", with_fraction(u / 1_000_000, u % 1_000_000, 6))
    } else {
        let total_secs = u / 1_000_000_000;
        let hours = total_secs / 3600;
        let minutes = total_secs / 60 % 60;
        let secs = total_secs % 60;

        let mut out = String::new();
        if hours > 0 {
            out.push_str(&format!("{}h", hours));
        }
        if hours > 0 || minutes > 0 {
            out.push_str(&format!("{}m", minutes));
        }
        out.push_str(&with_fraction(secs, u % 1_000_000_000, 9));
        out.push('s');
        out
    };
    format!("{}{}", sign, body)
}

impl Filter for DurationFilter {
    fn evaluate(&self, input: &dyn ValueView, _runtime: &dyn Runtime) -> Result<Value> {
        let nanos = input
            .as_scalar()
            .and_then(|s| s.to_integer())
            .unwrap_or(0);
        Ok(Value::scalar(format_nanos(nanos)))
    }
}

use regex::Regex;
use std::sync::OnceLock;

/// Suggest a timer length (in minutes) from an instruction such as
/// "Simmer for 5 minutes". Minute mentions win over hour mentions; only the
/// first number of the winning unit is used.
pub fn extract_suggested_minutes(instruction: &str) -> Option<u32> {
    static MINUTES_RE: OnceLock<Regex> = OnceLock::new();
    static HOURS_RE: OnceLock<Regex> = OnceLock::new();

    let minutes_re = MINUTES_RE
        .get_or_init(|| Regex::new(r"(?i)(\d+)\s*(?:minute|min)").expect("valid minutes regex"));
    let hours_re =
        HOURS_RE.get_or_init(|| Regex::new(r"(?i)(\d+)\s*(?:hour|hr)").expect("valid hours regex"));

    if let Some(caps) = minutes_re.captures(instruction) {
        return caps[1].parse::<u32>().ok();
    }

    hours_re
        .captures(instruction)
        .and_then(|caps| caps[1].parse::<u32>().ok())
        .and_then(|hours| hours.checked_mul(60))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minutes_are_extracted() {
        assert_eq!(extract_suggested_minutes("Simmer for 5 minutes"), Some(5));
        assert_eq!(extract_suggested_minutes("Rest 10 mins"), Some(10));
        assert_eq!(extract_suggested_minutes("Bake 25min until golden"), Some(25));
    }

    #[test]
    fn hours_are_converted() {
        assert_eq!(extract_suggested_minutes("Bake for 2 hours"), Some(120));
        assert_eq!(extract_suggested_minutes("Chill 1 HR"), Some(60));
    }

    #[test]
    fn minutes_take_priority_over_hours() {
        assert_eq!(
            extract_suggested_minutes("Roast 1 hour, then rest 15 minutes"),
            Some(15)
        );
    }

    #[test]
    fn first_minute_mention_wins() {
        assert_eq!(
            extract_suggested_minutes("Cook 3 minutes per side, about 6 minutes total"),
            Some(3)
        );
    }

    #[test]
    fn no_duration_yields_none() {
        assert_eq!(extract_suggested_minutes("Season with salt"), None);
        assert_eq!(extract_suggested_minutes(""), None);
    }

    #[test]
    fn overflowing_numbers_yield_none() {
        assert_eq!(extract_suggested_minutes("Wait 99999999999 minutes"), None);
        assert_eq!(extract_suggested_minutes("Wait 4294967295 hours"), None);
    }
}

use chrono::{Datelike, Utc};

pub fn daily_tip(tips: &[String]) -> Option<&str> {
    tip_for_ordinal(tips, Utc::now().ordinal() as usize)
}

fn tip_for_ordinal(tips: &[String], ordinal: usize) -> Option<&str> {
    if tips.is_empty() {
        return None;
    }
    Some(tips[ordinal % tips.len()].as_str())
}

use serde::{Deserialize, Serialize};

/// One numbered course meeting ("Pertemuan") as seen for one participant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    /// 1-based meeting number; gaps and repeats are kept as scraped
    pub session_index: u32,
    pub pre_test_completed: bool,
    pub post_test_completed: bool,
}

impl SessionRecord {
    pub fn new(session_index: u32, pre_test_completed: bool, post_test_completed: bool) -> Self {
        Self {
            session_index,
            pre_test_completed,
            post_test_completed,
        }
    }

    /// Present ("hadir") when either test of the meeting was submitted
    pub fn is_present(&self) -> bool {
        self.pre_test_completed || self.post_test_completed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presence_follows_test_flags() {
        assert!(SessionRecord::new(1, true, false).is_present());
        assert!(SessionRecord::new(1, false, true).is_present());
        assert!(SessionRecord::new(1, true, true).is_present());
        assert!(!SessionRecord::new(1, false, false).is_present());
    }

    #[test]
    fn test_presence_tracks_flag_changes() {
        let mut record = SessionRecord::new(3, false, false);
        assert!(!record.is_present());

        record.post_test_completed = true;
        assert!(record.is_present());
    }
}

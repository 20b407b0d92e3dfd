//! Status domains for schedules, visits and tasks.
//!
//! Each domain is a closed enum with a single canonical string form. All
//! membership checks in the crate go through the generated `FromStr`.

/// A status string that does not belong to the expected domain.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {domain} status: {value}")]
pub struct UnknownStatus {
    pub domain: &'static str,
    pub value: String,
}

crate::define_status_enum!(ScheduleStatus, "schedule", {
    Upcoming => "upcoming",
    InProgress => "in_progress",
    Completed => "completed",
    Missed => "missed",
});

crate::define_status_enum!(VisitStatus, "visit", {
    NotStarted => "not_started",
    InProgress => "in_progress",
    Completed => "completed",
});

impl VisitStatus {
    /// Visits only move forward and a completed visit is final.
    pub fn can_move_to(self, next: VisitStatus) -> bool {
        let rank = |status: VisitStatus| match status {
            VisitStatus::NotStarted => 0,
            VisitStatus::InProgress => 1,
            VisitStatus::Completed => 2,
        };
        self != VisitStatus::Completed && rank(next) >= rank(self)
    }
}

crate::define_status_enum!(TaskStatus, "task", {
    Pending => "pending",
    Completed => "completed",
    NotCompleted => "not_completed",
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_through_canonical_strings() {
        for status in ScheduleStatus::ALL {
            assert_eq!(status.as_str().parse::<ScheduleStatus>().unwrap(), *status);
        }
        for status in VisitStatus::ALL {
            assert_eq!(status.as_str().parse::<VisitStatus>().unwrap(), *status);
        }
        for status in TaskStatus::ALL {
            assert_eq!(status.as_str().parse::<TaskStatus>().unwrap(), *status);
        }
    }

    #[test]
    fn test_visit_status_moves_forward_only() {
        use VisitStatus::*;
        assert!(NotStarted.can_move_to(InProgress));
        assert!(InProgress.can_move_to(InProgress));
        assert!(InProgress.can_move_to(Completed));
        assert!(!InProgress.can_move_to(NotStarted));
        for next in VisitStatus::ALL {
            assert!(!Completed.can_move_to(*next));
        }
    }

    #[test]
    fn test_unknown_status_names_its_domain() {
        let err = "pending".parse::<ScheduleStatus>().unwrap_err();
        assert_eq!(err.domain, "schedule");
        assert_eq!(err.to_string(), "invalid schedule status: pending");
    }

    #[test]
    fn test_parsing_is_case_sensitive() {
        assert!("Completed".parse::<TaskStatus>().is_err());
        assert!("IN_PROGRESS".parse::<VisitStatus>().is_err());
    }

    #[test]
    fn test_serde_uses_snake_case_names() {
        let json = serde_json::to_string(&TaskStatus::NotCompleted).unwrap();
        assert_eq!(json, "\"not_completed\"");
        let parsed: ScheduleStatus = serde_json::from_str("\"in_progress\"").unwrap();
        assert_eq!(parsed, ScheduleStatus::InProgress);
    }
}

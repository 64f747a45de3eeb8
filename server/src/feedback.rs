//! Feedback intake: one row per employee, arbitrated by the unique index on
//! `name`. Concurrent submissions with the same name race at the database;
//! exactly one wins and the loser observes the uniqueness violation.

use chrono::Utc;
use entity::feedback;
use platform_db::DbPool;
use sea_orm::{ActiveModelTrait, DbErr, Set, SqlErr};
use serde::Deserialize;

pub const RATING_RANGE: std::ops::RangeInclusive<i16> = 1..=5;

#[derive(Clone, Debug, Deserialize)]
pub struct FeedbackForm {
    pub name: String,
    pub department: String,
    pub work_environment: i16,
    pub management: i16,
    pub work_life_balance: i16,
    pub development_potential: i16,
    pub overall: i16,
}

impl FeedbackForm {
    /// Field checks ahead of the database constraints, so a bad value gets a
    /// readable message instead of an opaque write failure. The CHECK and
    /// UNIQUE constraints remain the backstop.
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("name must not be empty".to_string());
        }
        for (field, value) in [
            ("work_environment", self.work_environment),
            ("management", self.management),
            ("work_life_balance", self.work_life_balance),
            ("development_potential", self.development_potential),
            ("overall", self.overall),
        ] {
            if !RATING_RANGE.contains(&value) {
                return Err(format!("{field} must be between 1 and 5"));
            }
        }
        Ok(())
    }
}

/// `Duplicate` is a recovered condition, not an error: no row is created
/// and the caller renders a notice instead of an error page.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SubmitOutcome {
    Submitted,
    Duplicate,
}

pub async fn submit(pool: &DbPool, form: FeedbackForm) -> Result<SubmitOutcome, DbErr> {
    let record = feedback::ActiveModel {
        name: Set(form.name.trim().to_string()),
        department: Set(form.department),
        work_environment: Set(form.work_environment),
        management: Set(form.management),
        work_life_balance: Set(form.work_life_balance),
        development_potential: Set(form.development_potential),
        overall: Set(form.overall),
        created_at: Set(Utc::now().into()),
        ..Default::default()
    };
    match record.insert(pool).await {
        Ok(_) => Ok(SubmitOutcome::Submitted),
        Err(err) => match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => Ok(SubmitOutcome::Duplicate),
            _ => Err(err),
        },
    }
}

//! Versioned schema steps.
//!
//! A backend records the last step it applied and replays the missing ones
//! in order when it is opened.

use crate::{StorageError, StorageResult};

/// Schema version this build writes
pub const CURRENT_VERSION: u32 = 2;

/// One schema step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchemaVersion {
    pub version: u32,
    pub description: &'static str,
}

/// Every step, oldest first
pub const MIGRATIONS: &[SchemaVersion] = &[
    SchemaVersion {
        version: 1,
        description: "friendship edges",
    },
    SchemaVersion {
        version: 2,
        description: "friend group memberships",
    },
];

/// Steps needed to bring a schema at `current` up to `target`
pub fn steps_between(current: u32, target: u32) -> impl Iterator<Item = &'static SchemaVersion> {
    MIGRATIONS
        .iter()
        .filter(move |step| step.version > current && step.version <= target)
}

/// A backend whose schema is upgraded in place
pub trait Migratable {
    fn schema_version(&self) -> StorageResult<u32>;

    fn set_schema_version(&self, version: u32) -> StorageResult<()>;

    /// Apply one step. Steps must be safe to re-run.
    fn apply(&self, step: &SchemaVersion) -> StorageResult<()>;

    /// Upgrade to `CURRENT_VERSION`.
    ///
    /// A schema written by a newer build is refused instead of being read
    /// with the wrong layout.
    fn migrate_to_latest(&self) -> StorageResult<()> {
        let current = self.schema_version()?;

        if current > CURRENT_VERSION {
            return Err(StorageError::Migration(format!(
                "schema version {} is newer than supported version {}",
                current, CURRENT_VERSION
            )));
        }
        if current == CURRENT_VERSION {
            tracing::debug!(version = current, "Schema up to date");
            return Ok(());
        }

        for step in steps_between(current, CURRENT_VERSION) {
            self.apply(step)?;
            self.set_schema_version(step.version)?;
            tracing::info!(version = step.version, "Applied schema step: {}", step.description);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};

    struct Recorder {
        version: Cell<u32>,
        applied: RefCell<Vec<u32>>,
    }

    impl Recorder {
        fn at(version: u32) -> Self {
            Self {
                version: Cell::new(version),
                applied: RefCell::new(Vec::new()),
            }
        }
    }

    impl Migratable for Recorder {
        fn schema_version(&self) -> StorageResult<u32> {
            Ok(self.version.get())
        }

        fn set_schema_version(&self, version: u32) -> StorageResult<()> {
            self.version.set(version);
            Ok(())
        }

        fn apply(&self, step: &SchemaVersion) -> StorageResult<()> {
            self.applied.borrow_mut().push(step.version);
            Ok(())
        }
    }

    #[test]
    fn test_steps_are_contiguous() {
        let versions: Vec<u32> = MIGRATIONS.iter().map(|step| step.version).collect();
        assert_eq!(versions, (1..=CURRENT_VERSION).collect::<Vec<_>>());
        assert_eq!(steps_between(1, 2).count(), 1);
        assert_eq!(steps_between(2, 2).count(), 0);
    }

    #[test]
    fn test_fresh_schema_applies_each_step_once() {
        let recorder = Recorder::at(0);
        recorder.migrate_to_latest().unwrap();
        recorder.migrate_to_latest().unwrap();

        assert_eq!(*recorder.applied.borrow(), vec![1, 2]);
        assert_eq!(recorder.schema_version().unwrap(), CURRENT_VERSION);
    }

    #[test]
    fn test_partial_schema_resumes() {
        let recorder = Recorder::at(1);
        recorder.migrate_to_latest().unwrap();
        assert_eq!(*recorder.applied.borrow(), vec![2]);
    }

    #[test]
    fn test_newer_schema_is_refused() {
        let recorder = Recorder::at(CURRENT_VERSION + 1);
        assert!(matches!(
            recorder.migrate_to_latest(),
            Err(StorageError::Migration(_))
        ));
        assert!(recorder.applied.borrow().is_empty());
    }
}

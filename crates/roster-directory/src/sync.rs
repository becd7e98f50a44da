//! Replace-all staging of user associations.

use std::collections::BTreeSet;

use roster_core::models::association::AssociationDimension;
use roster_core::repository::UnitOfWork;
use tracing::debug;
use uuid::Uuid;

/// Stages the replacement of a user's whole association set in one
/// dimension. Nothing is visible until the unit of work commits.
pub struct AssociationSyncer;

impl AssociationSyncer {
    /// Stage deletion of every existing row, then one insert per distinct
    /// id in `new_ids`. Returns the number of inserts staged.
    pub fn replace_associations<W: UnitOfWork>(
        work: &mut W,
        tenant_id: Uuid,
        user_id: Uuid,
        dimension: AssociationDimension,
        new_ids: &[Uuid],
    ) -> usize {
        work.delete_associations(tenant_id, user_id, dimension);

        let distinct: BTreeSet<Uuid> = new_ids.iter().copied().collect();
        for target_id in &distinct {
            work.insert_association(tenant_id, user_id, dimension, *target_id);
        }

        debug!(
            %tenant_id,
            %user_id,
            %dimension,
            count = distinct.len(),
            "Staged association replacement"
        );
        distinct.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roster_core::error::RosterResult;
    use roster_core::models::user::{NewUserRecord, UserRecordChanges};

    #[derive(Debug, PartialEq)]
    enum Staged {
        Delete(AssociationDimension),
        Insert(AssociationDimension, Uuid),
        Other,
    }

    #[derive(Default)]
    struct RecordingWork {
        staged: Vec<Staged>,
    }

    impl UnitOfWork for RecordingWork {
        fn insert_user(&mut self, _user: &NewUserRecord) {
            self.staged.push(Staged::Other);
        }

        fn update_user(&mut self, _: Uuid, _: Uuid, _: &str, _: &UserRecordChanges) {
            self.staged.push(Staged::Other);
        }

        fn replace_user_roles(&mut self, _: Uuid, _: Uuid, _: &[Uuid]) {
            self.staged.push(Staged::Other);
        }

        fn delete_associations(&mut self, _: Uuid, _: Uuid, dimension: AssociationDimension) {
            self.staged.push(Staged::Delete(dimension));
        }

        fn insert_association(
            &mut self,
            _: Uuid,
            _: Uuid,
            dimension: AssociationDimension,
            target_id: Uuid,
        ) {
            self.staged.push(Staged::Insert(dimension, target_id));
        }

        fn staged(&self) -> usize {
            self.staged.len()
        }

        async fn commit(self) -> RosterResult<()> {
            Ok(())
        }
    }

    #[test]
    fn delete_precedes_deduplicated_inserts() {
        let mut work = RecordingWork::default();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();

        let inserted = AssociationSyncer::replace_associations(
            &mut work,
            Uuid::new_v4(),
            Uuid::new_v4(),
            AssociationDimension::Job,
            &[a, b, a],
        );

        assert_eq!(inserted, 2);
        assert_eq!(work.staged[0], Staged::Delete(AssociationDimension::Job));
        assert_eq!(work.staged.len(), 3);
        assert!(work.staged.contains(&Staged::Insert(AssociationDimension::Job, a)));
        assert!(work.staged.contains(&Staged::Insert(AssociationDimension::Job, b)));
    }

    #[test]
    fn empty_set_only_deletes() {
        let mut work = RecordingWork::default();
        let inserted = AssociationSyncer::replace_associations(
            &mut work,
            Uuid::new_v4(),
            Uuid::new_v4(),
            AssociationDimension::Organization,
            &[],
        );

        assert_eq!(inserted, 0);
        assert_eq!(
            work.staged,
            vec![Staged::Delete(AssociationDimension::Organization)]
        );
    }
}

use application::{ApplicationError, ports::ReputationPort};
use async_trait::async_trait;
use domain::{MemberId, ReputationSample, ReputationSource};

use super::InMemoryWorld;

/// Below this a relationship counts as gone
const NEGLIGIBLE: f64 = 1e-9;

#[async_trait]
impl ReputationPort for InMemoryWorld {
    async fn sample(&self, member: MemberId) -> Result<ReputationSample, ApplicationError> {
        let state = self.state.read();
        let book = &state.reputation;
        let (positive, total) = book
            .relations
            .get(&member)
            .map(|relations| {
                relations.values().fold((0.0, 0.0), |(positive, total), &v| {
                    (positive + v.max(0.0), total + v)
                })
            })
            .unwrap_or_default();
        Ok(ReputationSample {
            positive,
            total,
            speaks_well_bonus: book.speaks_well_bonus.get(&member).copied().unwrap_or_default(),
        })
    }

    async fn given_total(
        &self,
        giver: MemberId,
        receiver: MemberId,
    ) -> Result<f64, ApplicationError> {
        Ok(self
            .state
            .read()
            .reputation
            .relations
            .get(&receiver)
            .and_then(|r| r.get(&ReputationSource::Member(giver)))
            .copied()
            .unwrap_or_default())
    }

    async fn given_today(
        &self,
        giver: MemberId,
        receiver: MemberId,
    ) -> Result<f64, ApplicationError> {
        Ok(self
            .state
            .read()
            .reputation
            .today
            .get(&(giver, receiver))
            .copied()
            .unwrap_or_default())
    }

    async fn adjust(
        &self,
        target: MemberId,
        source: ReputationSource,
        delta: f64,
    ) -> Result<(), ApplicationError> {
        let mut state = self.state.write();
        let relations = state.reputation.relations.entry(target).or_default();
        let value = relations.entry(source).or_default();
        *value += delta;
        if value.abs() < NEGLIGIBLE {
            relations.remove(&source);
        }
        Ok(())
    }

    async fn contributions(
        &self,
        target: MemberId,
    ) -> Result<Vec<(ReputationSource, f64)>, ApplicationError> {
        Ok(self
            .state
            .read()
            .reputation
            .relations
            .get(&target)
            .map(|r| r.iter().map(|(s, v)| (*s, *v)).collect())
            .unwrap_or_default())
    }

    async fn replenish(&self, giver: MemberId) -> Result<(), ApplicationError> {
        let mut state = self.state.write();
        state.reputation.today.retain(|(g, _), _| *g != giver);
        state.reputation.replenished.push(giver);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use domain::{CompanyId, Polarity};

    use super::*;

    #[tokio::test]
    async fn sample_splits_positive_and_total() {
        let world = InMemoryWorld::new();
        let target = world.add_member("Target");
        world.give_reputation(world.add_member("Fan"), target, 10.0, false);
        world.give_reputation(world.add_member("Critic"), target, -2.0, false);
        world.set_speaks_well_bonus(target, 1.5);

        let sample = world.sample(target).await.unwrap();
        assert!((sample.positive - 10.0).abs() < 1e-9);
        assert!((sample.total - 8.0).abs() < 1e-9);
        assert!((sample.speaks_well_bonus - 1.5).abs() < 1e-9);
    }

    #[tokio::test]
    async fn adjust_to_zero_drops_the_relationship() {
        let world = InMemoryWorld::new();
        let target = world.add_member("Target");
        let source = ReputationSource::Accumulator {
            company: CompanyId::new(),
            polarity: Polarity::Positive,
        };

        world.adjust(target, source, 3.0).await.unwrap();
        assert_eq!(world.contributions(target).await.unwrap(), vec![(source, 3.0)]);

        world.adjust(target, source, -3.0).await.unwrap();
        assert!(world.contributions(target).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn replenish_clears_todays_gifts() {
        let world = InMemoryWorld::new();
        let giver = world.add_member("Giver");
        let receiver = world.add_member("Receiver");
        world.give_reputation(giver, receiver, 2.0, true);
        assert!((world.given_today(giver, receiver).await.unwrap() - 2.0).abs() < 1e-9);

        world.replenish(giver).await.unwrap();
        assert!(world.given_today(giver, receiver).await.unwrap().abs() < f64::EPSILON);
        assert_eq!(world.replenished(), vec![giver]);
    }
}

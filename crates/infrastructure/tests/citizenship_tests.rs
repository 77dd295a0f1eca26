//! Settlement citizenship of companies and their employees

mod common;

use application::{ApplicationError, CompanyPolicy};
use common::Fixture;
use domain::{Eligibility, PlotSizing, Property, PropertyKind, Settlement, SettlementId};
use infrastructure::{NoticeChannel, SettlementRules};

impl Fixture {
    fn settlement(&self, name: &str) -> SettlementId {
        self.world().add_settlement(Settlement::new(name))
    }

    /// Hand the company a homestead inside `settlement`
    async fn headquarters_in(&self, settlement: SettlementId) {
        let hq = self.world().add_property(
            Property::new("Cottage", PropertyKind::Homestead, None)
                .with_plots(PlotSizing::new(0, 10))
                .with_settlement(settlement),
        );
        self.transfer(hq, Some(self.legal)).await;
    }

    fn citizenship(&self, member: domain::MemberId) -> Option<SettlementId> {
        self.world().member_record(member).unwrap().citizenship
    }
}

#[tokio::test]
async fn headquarters_settlement_naturalizes_everyone() {
    let fx = Fixture::new().await;
    let member = fx.hire("Member").await;
    let town = fx.settlement("Riverdale");

    fx.headquarters_in(town).await;

    for citizen in [fx.legal, fx.leader, member] {
        assert_eq!(fx.citizenship(citizen), Some(town));
    }
    let log = fx.world().roster_log();
    assert!(
        log.iter()
            .filter(|c| c.member != fx.legal)
            .all(|c| c.joined && c.employer_driven)
    );
    assert!(
        fx.world()
            .notice_texts()
            .contains(&"Acme has joined Riverdale.".to_string())
    );
}

#[tokio::test]
async fn new_hires_follow_the_company_settlement() {
    let fx = Fixture::new().await;
    let town = fx.settlement("Riverdale");
    fx.headquarters_in(town).await;

    let member = fx.hire("Member").await;

    assert_eq!(fx.citizenship(member), Some(town));
    assert!(fx.world().citizens_of(town).contains(&member));
}

#[tokio::test]
async fn citizenship_is_not_mirrored_without_property_limits() {
    let fx = Fixture::with_policy(CompanyPolicy {
        property_limits_enabled: false,
        ..CompanyPolicy::default()
    })
    .await;
    let town = fx.settlement("Riverdale");

    fx.headquarters_in(town).await;

    assert_eq!(fx.citizenship(fx.legal), Some(town));
    assert_eq!(fx.citizenship(fx.leader), None);
}

#[tokio::test]
async fn applying_without_an_approver_admits_directly() {
    let fx = Fixture::new().await;
    let town = fx.settlement("Riverdale");

    let outcome = fx
        .service()
        .apply_to_settlement(fx.id, fx.leader, town)
        .await
        .unwrap();

    assert_eq!(outcome.message, "Acme has joined Riverdale");
    assert_eq!(fx.citizenship(fx.legal), Some(town));
    assert_eq!(fx.citizenship(fx.leader), Some(town));
    assert!(fx.world().applicants_of(town).is_empty());
}

#[tokio::test]
async fn applying_with_an_approver_mails_them() {
    let fx = Fixture::new().await;
    let mayor = fx.world().add_member("Mayor");
    let town = fx
        .world()
        .add_settlement(Settlement::new("Hilltop").with_approver(mayor));

    let outcome = fx
        .service()
        .apply_to_settlement(fx.id, fx.leader, town)
        .await
        .unwrap();

    assert_eq!(outcome.message, "Acme has applied to join Hilltop");
    assert_eq!(fx.world().applicants_of(town), vec![fx.legal]);
    assert_eq!(fx.citizenship(fx.legal), None);
    assert!(fx.world().notices().iter().any(|n| n.channel == NoticeChannel::Mailbox(mayor)
        && n.notice.text.starts_with("Acme has applied to be a Citizen of Hilltop.")));

    let again = fx.service().apply_to_settlement(fx.id, fx.leader, town).await;
    assert!(matches!(again, Err(ApplicationError::Rejected(_))));
}

#[tokio::test]
async fn only_the_leader_applies() {
    let fx = Fixture::new().await;
    let member = fx.hire("Member").await;
    let town = fx.settlement("Riverdale");

    let result = fx.service().apply_to_settlement(fx.id, member, town).await;

    assert!(matches!(result, Err(ApplicationError::Company(ref e)) if e.code() == "NotAuthorized"));
    assert_eq!(fx.citizenship(fx.legal), None);
}

#[tokio::test]
async fn immigration_rules_are_reported() {
    let fx = Fixture::new().await;
    let closed = fx.settlement("Closed");
    let full = fx.settlement("Full");
    fx.world().set_settlement_rules(
        closed,
        SettlementRules {
            immigration_denial: Some("the borders are closed".into()),
            ..SettlementRules::default()
        },
    );
    fx.world().set_settlement_rules(
        full,
        SettlementRules {
            roster_denial: Some("the roster is full".into()),
            ..SettlementRules::default()
        },
    );

    assert_eq!(
        fx.service().can_join(fx.id, closed).await.unwrap(),
        Eligibility::denied("the borders are closed")
    );
    assert_eq!(
        fx.service().can_join(fx.id, full).await.unwrap(),
        Eligibility::denied("Couldn't join Full as the roster is full")
    );
    let refused = fx.service().join_settlement(fx.id, fx.leader, full).await;
    assert!(matches!(refused, Err(ApplicationError::Rejected(ref r)) if r == "Couldn't join Full as the roster is full"));
}

#[tokio::test]
async fn joining_an_approved_settlement_needs_an_invitation() {
    let fx = Fixture::new().await;
    let mayor = fx.world().add_member("Mayor");
    let town = fx
        .world()
        .add_settlement(Settlement::new("Hilltop").with_approver(mayor));

    let uninvited = fx.service().join_settlement(fx.id, fx.leader, town).await;
    assert!(matches!(uninvited, Err(ApplicationError::Rejected(ref r)) if r.contains("has not been invited")));

    fx.world().invite_to_settlement(town, fx.legal);
    fx.service()
        .join_settlement(fx.id, fx.leader, town)
        .await
        .unwrap();

    assert_eq!(fx.citizenship(fx.legal), Some(town));
    let legal_joins: Vec<_> = fx
        .world()
        .roster_log()
        .into_iter()
        .filter(|c| c.member == fx.legal)
        .collect();
    assert_eq!(legal_joins.len(), 1);
    assert!(legal_joins[0].joined && !legal_joins[0].employer_driven);
}

#[tokio::test]
async fn leaving_takes_the_employees_along() {
    let fx = Fixture::new().await;
    let member = fx.hire("Member").await;
    let town = fx.settlement("Riverdale");
    fx.service()
        .join_settlement(fx.id, fx.leader, town)
        .await
        .unwrap();
    assert_eq!(fx.citizenship(member), Some(town));

    let outcome = fx.service().leave_settlement(fx.id, fx.leader).await.unwrap();

    assert_eq!(outcome.message, "Acme has left Riverdale");
    assert!(fx.world().citizens_of(town).is_empty());
    assert_eq!(fx.citizenship(member), None);
    assert!(
        fx.world()
            .roster_log()
            .iter()
            .any(|c| c.member == fx.legal && !c.joined && c.forced)
    );
}

#[tokio::test]
async fn leaving_respects_settlement_rules() {
    let fx = Fixture::new().await;
    let nation = fx.settlement("Nation");
    let city = fx
        .world()
        .add_settlement(Settlement::new("City").with_parent(nation));
    fx.service()
        .join_settlement(fx.id, fx.leader, city)
        .await
        .unwrap();
    fx.world().set_settlement_rules(
        nation,
        SettlementRules {
            property_leave_denial: Some("Acme still owns property in Nation".into()),
            ..SettlementRules::default()
        },
    );

    let refused = fx.service().leave_settlement(fx.id, fx.leader).await;
    assert!(matches!(refused, Err(ApplicationError::Rejected(ref r)) if r == "Acme still owns property in Nation"));

    fx.world().set_settlement_rules(nation, SettlementRules::default());
    fx.world().set_settlement_rules(
        city,
        SettlementRules {
            homestead_leave_denial: Some("the HQ is inside City".into()),
            ..SettlementRules::default()
        },
    );
    assert_eq!(
        fx.service().can_leave(fx.id).await.unwrap(),
        Eligibility::denied("Couldn't leave City as the HQ is inside City")
    );
    assert_eq!(fx.citizenship(fx.legal), Some(city));
}

#[tokio::test]
async fn stateless_company_cannot_leave() {
    let fx = Fixture::new().await;

    let result = fx.service().leave_settlement(fx.id, fx.leader).await;

    assert!(matches!(result, Err(ApplicationError::Rejected(ref r)) if r == "Acme is not currently part of any settlement."));
    assert!(!fx.service().can_leave(fx.id).await.unwrap().is_allowed());
}

#[tokio::test]
async fn desync_drops_a_citizenship_missing_from_the_roster() {
    let fx = Fixture::new().await;
    let town = fx.settlement("Riverdale");
    fx.service()
        .join_settlement(fx.id, fx.leader, town)
        .await
        .unwrap();
    fx.world().corrupt_roster(town, fx.legal, false);

    let report = fx.service().check_citizenship_desync(fx.id).await.unwrap();

    assert!(report.corrected);
    assert_eq!(
        report.description,
        "Acme was a citizen of Riverdale but not on the roster, removing..."
    );
    assert_eq!(fx.citizenship(fx.legal), None);
}

#[tokio::test]
async fn desync_records_a_roster_only_citizenship() {
    let fx = Fixture::new().await;
    let town = fx.settlement("Riverdale");
    fx.world().corrupt_roster(town, fx.legal, true);

    let report = fx.service().check_citizenship_desync(fx.id).await.unwrap();

    assert!(report.corrected);
    assert_eq!(
        report.description,
        "Acme was on the roster for Riverdale but not a citizen of, updating..."
    );
    assert_eq!(fx.citizenship(fx.legal), Some(town));
    assert_eq!(fx.citizenship(fx.leader), Some(town));

    let again = fx.service().check_citizenship_desync(fx.id).await.unwrap();
    assert!(!again.corrected);
}

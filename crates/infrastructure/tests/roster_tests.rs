//! Roster transitions driven against the in-memory world

mod common;

use application::{ApplicationError, CompanyPolicy};
use common::Fixture;
use domain::{
    Account, AccountKind, ActionVerdict, CompanyError, ErrorKind, GameAction, MembershipStatus,
    Property, PropertyKind,
};
use infrastructure::{CompanyRuntime, NoticeChannel};

fn company_error(result: Result<impl std::fmt::Debug, ApplicationError>) -> CompanyError {
    match result {
        Err(ApplicationError::Company(e)) => e,
        other => panic!("expected a company error, got {other:?}"),
    }
}

#[tokio::test]
async fn founder_leads_and_is_never_a_member() {
    let fx = Fixture::new().await;

    let err = company_error(fx.service().invite(fx.id, fx.leader, fx.leader).await);
    assert_eq!(err.code(), "AlreadyEmployed");
    assert!(!fx.service().force_join(fx.id, fx.leader).await.unwrap());

    let company = fx.company();
    assert_eq!(company.leader(), Some(fx.leader));
    assert_eq!(company.members().count(), 0);
    assert_eq!(company.all_employees(), vec![fx.leader]);
}

#[tokio::test]
async fn invite_then_join_matches_force_join() {
    let fx = Fixture::new().await;
    let invited = fx.hire("Invited").await;
    let forced = fx.world().add_member("Forced");

    assert!(fx.service().force_join(fx.id, forced).await.unwrap());

    let company = fx.company();
    for member in [invited, forced] {
        assert_eq!(company.membership_status(member), MembershipStatus::Employee);
        assert!(!company.is_invited(member));
    }
    let treasury = fx.world().account_record(company.treasury()).unwrap();
    assert!(treasury.users.contains(&invited) && treasury.users.contains(&forced));
    assert_eq!(treasury.managers.len(), 1);

    // only the regular path goes through the pipeline
    let joins: Vec<GameAction> = fx
        .pipeline()
        .committed()
        .into_iter()
        .filter(|a| matches!(a, GameAction::CitizenJoinCompany { .. }))
        .collect();
    assert_eq!(
        joins,
        vec![GameAction::CitizenJoinCompany {
            citizen: invited,
            company_legal_identity: fx.legal,
        }]
    );
}

#[tokio::test]
async fn leader_cannot_resign_or_be_fired() {
    let fx = Fixture::new().await;
    let member = fx.hire("Member").await;
    let performed = fx.pipeline().performed().len();

    let fired = company_error(fx.service().fire(fx.id, fx.leader, fx.leader).await);
    let resigned = company_error(fx.service().leave(fx.id, fx.leader).await);

    assert_eq!(fired.code(), "IsLeader");
    assert_eq!(resigned.code(), "IsLeader");
    let company = fx.company();
    assert_eq!(company.leader(), Some(fx.leader));
    assert_eq!(company.members().collect::<Vec<_>>(), vec![member]);
    assert_eq!(fx.pipeline().performed().len(), performed);
}

#[tokio::test]
async fn double_invite_is_a_conflict() {
    let fx = Fixture::new().await;
    let target = fx.world().add_member("Target");

    fx.service().invite(fx.id, fx.leader, target).await.unwrap();
    let err = company_error(fx.service().invite(fx.id, fx.leader, target).await);

    assert_eq!(err.code(), "AlreadyInvited");
    assert_eq!(err.kind(), ErrorKind::StateConflict);
    assert_eq!(fx.company().invitees().collect::<Vec<_>>(), vec![target]);
}

#[tokio::test]
async fn invite_mails_the_target_and_tells_the_company() {
    let fx = Fixture::new().await;
    let target = fx.world().add_member("Target");

    let outcome = fx.service().invite(fx.id, fx.leader, target).await.unwrap();

    assert_eq!(outcome.message, "Invited Target to Acme");
    let notices = fx.world().notices();
    assert!(notices.iter().any(|n| n.channel == NoticeChannel::Mailbox(target)
        && n.notice.text.starts_with("You have been invited to join Acme")));
    assert!(notices.iter().any(|n| n.channel == NoticeChannel::Member(fx.leader)
        && n.notice.text == "Leader has invited Target to join the company."));
}

#[tokio::test]
async fn only_the_leader_invites() {
    let fx = Fixture::new().await;
    let member = fx.hire("Member").await;
    let target = fx.world().add_member("Target");

    let err = company_error(fx.service().invite(fx.id, member, target).await);

    assert_eq!(err.kind(), ErrorKind::Authorization);
    assert!(!fx.company().is_invited(target));
}

#[tokio::test]
async fn revoked_invitation_cannot_be_accepted() {
    let fx = Fixture::new().await;
    let target = fx.world().add_member("Target");
    fx.service().invite(fx.id, fx.leader, target).await.unwrap();

    fx.service()
        .revoke_invite(fx.id, fx.leader, target)
        .await
        .unwrap();
    let err = company_error(fx.service().join(fx.id, target).await);

    assert_eq!(err.code(), "NotInvited");
    assert_eq!(
        fx.service().membership_status(fx.id, target).await.unwrap(),
        MembershipStatus::Outsider
    );
}

#[tokio::test]
async fn rejected_join_changes_nothing() {
    let fx = Fixture::new().await;
    let target = fx.world().add_member("Target");
    fx.service().invite(fx.id, fx.leader, target).await.unwrap();
    fx.pipeline().add_validator(|action: &GameAction| {
        matches!(action, GameAction::CitizenJoinCompany { .. })
            .then(|| "the company roster is full".to_string())
    });

    let result = fx.service().join(fx.id, target).await;

    assert!(matches!(result, Err(ApplicationError::Rejected(ref r)) if r == "the company roster is full"));
    let company = fx.company();
    assert!(company.is_invited(target));
    assert!(!company.is_employee(target));
    assert_eq!(
        fx.pipeline().performed().last().unwrap().verdict,
        ActionVerdict::Rejected {
            reason: "the company roster is full".into()
        }
    );
}

#[tokio::test]
async fn joining_while_employed_elsewhere_is_refused() {
    let fx = Fixture::new().await;
    let rival_leader = fx.world().add_member("Rival");
    let rival = fx
        .service()
        .found_company(rival_leader, "Rival Corp")
        .await
        .unwrap();
    fx.service()
        .invite(rival.id, rival_leader, fx.leader)
        .await
        .unwrap();

    let err = company_error(fx.service().join(rival.id, fx.leader).await);

    assert_eq!(err.code(), "AlreadyEmployedElsewhere");
}

#[tokio::test]
async fn homestead_owners_cannot_join_under_property_limits() {
    let fx = Fixture::new().await;
    let target = fx.world().add_member("Target");
    let home = fx
        .world()
        .add_property(Property::new("Farm", PropertyKind::Homestead, Some(target)));
    fx.world().corrupt_homestead(target, Some(home));
    fx.service().invite(fx.id, fx.leader, target).await.unwrap();

    let err = company_error(fx.service().join(fx.id, target).await);

    assert_eq!(err.code(), "PropertyConflict");
    assert!(err.to_string().contains("You must remove Farm"));
}

#[tokio::test]
async fn homestead_owners_may_join_without_property_limits() {
    let fx = Fixture::with_policy(CompanyPolicy {
        property_limits_enabled: false,
        ..CompanyPolicy::default()
    })
    .await;
    let target = fx.world().add_member("Target");
    let home = fx
        .world()
        .add_property(Property::new("Farm", PropertyKind::Homestead, Some(target)));
    fx.world().corrupt_homestead(target, Some(home));
    fx.service().invite(fx.id, fx.leader, target).await.unwrap();

    fx.service().join(fx.id, target).await.unwrap();

    assert!(fx.company().is_employee(target));
}

#[tokio::test]
async fn fire_and_leave_remove_members() {
    let fx = Fixture::new().await;
    let fired = fx.hire("Fired").await;
    let resigned = fx.hire("Resigned").await;

    fx.service().fire(fx.id, fx.leader, fired).await.unwrap();
    fx.service().leave(fx.id, resigned).await.unwrap();

    assert_eq!(fx.company().members().count(), 0);
    let departures: Vec<bool> = fx
        .pipeline()
        .committed()
        .into_iter()
        .filter_map(|a| match a {
            GameAction::CitizenLeaveCompany { fired, .. } => Some(fired),
            _ => None,
        })
        .collect();
    assert_eq!(departures, vec![true, false]);
    let texts = fx.world().notice_texts();
    assert!(texts.contains(&"Leader has fired Fired from the company.".to_string()));
    assert!(texts.contains(&"Resigned has resigned from the company.".to_string()));
}

#[tokio::test]
async fn force_leave_never_removes_the_leader() {
    let fx = Fixture::new().await;

    assert!(!fx.service().force_leave(fx.id, fx.leader).await.unwrap());

    assert_eq!(fx.company().leader(), Some(fx.leader));
}

#[tokio::test]
async fn duplicate_force_join_reports_no_change() {
    let fx = Fixture::new().await;
    let member = fx.world().add_member("Member");

    assert!(fx.service().force_join(fx.id, member).await.unwrap());
    fx.world().clear_notices();
    assert!(!fx.service().force_join(fx.id, member).await.unwrap());

    assert!(fx.world().notices().is_empty());
    assert!(!fx.service().force_leave(fx.id, fx.world().add_member("Stranger")).await.unwrap());
}

#[tokio::test]
async fn force_join_moves_an_employee_between_companies() {
    let runtime = CompanyRuntime::in_memory(CompanyPolicy::default());
    let fx = Fixture::found_in(runtime, "Acme").await;
    let member = fx.hire("Member").await;
    let rival_leader = fx.world().add_member("Rival");
    let rival = fx
        .service()
        .found_company(rival_leader, "Rival Corp")
        .await
        .unwrap();

    assert!(fx.service().force_join(rival.id, member).await.unwrap());

    assert!(!fx.company().is_employee(member));
    let rival = fx.world().company_record(rival.id).unwrap();
    assert!(rival.is_employee(member));
    assert_eq!(
        fx.service().employer_of(member).await.unwrap().map(|c| c.id),
        Some(rival.id)
    );
}

#[tokio::test]
async fn promote_and_demote_move_the_leadership() {
    let fx = Fixture::new().await;
    let member = fx.hire("Member").await;

    assert!(fx.service().promote(fx.id, member).await.unwrap());

    let company = fx.company();
    assert_eq!(company.leader(), Some(member));
    assert_eq!(company.members().collect::<Vec<_>>(), vec![fx.leader]);
    assert!(fx.world().notices().iter().any(|n| n.channel == NoticeChannel::Everyone
        && n.notice.text == "Member is now the CEO of Acme!"));
    assert!(!fx.service().promote(fx.id, member).await.unwrap());

    fx.world().clear_notices();
    assert!(!fx.service().demote(fx.id, fx.leader).await.unwrap());
    assert!(fx.world().notices().is_empty());
    assert_eq!(fx.company().leader(), Some(member));

    assert!(fx.service().demote(fx.id, member).await.unwrap());
    assert!(
        fx.world()
            .notice_texts()
            .contains(&"Member has been removed as CEO.".to_string())
    );
    let company = fx.company();
    assert_eq!(company.leader(), None);
    assert!(company.is_employee(member));
    assert!(fx.service().shareholders(fx.id).await.unwrap().is_empty());
    assert!(!fx.service().demote(fx.id, member).await.unwrap());
}

#[tokio::test]
async fn leader_holds_every_share() {
    let fx = Fixture::new().await;
    fx.hire("Member").await;

    let holdings = fx.service().shareholders(fx.id).await.unwrap();

    assert_eq!(holdings.len(), 1);
    assert_eq!(holdings[0].holder, fx.leader);
    assert!((holdings[0].share - 1.0).abs() < f64::EPSILON);
}

#[tokio::test]
async fn roster_changes_mark_the_company_dirty() {
    let fx = Fixture::new().await;
    fx.world().take_dirty_companies();

    fx.hire("Member").await;

    assert_eq!(fx.world().take_dirty_companies(), vec![fx.id]);
}

#[tokio::test]
async fn registrar_lookups_find_the_company() {
    let fx = Fixture::new().await;
    let target = fx.world().add_member("Target");
    fx.service().invite(fx.id, fx.leader, target).await.unwrap();

    let mut pool = Account::new("Pool", AccountKind::Shared);
    pool.managers.insert(fx.legal);
    let pool = fx.world().add_account(pool);
    let mut levy = Account::new("Levy", AccountKind::Government);
    levy.managers.insert(fx.legal);
    let levy = fx.world().add_account(levy);
    let wallet = fx
        .world()
        .add_account(Account::new("Wallet", AccountKind::Personal { holder: fx.legal }));

    let service = fx.service();
    let found = |c: Option<domain::Company>| c.map(|c| c.id);
    assert_eq!(found(service.company_by_legal_identity(fx.legal).await.unwrap()), Some(fx.id));
    assert_eq!(found(service.company_by_legal_identity(fx.leader).await.unwrap()), None);
    assert_eq!(found(service.company_by_account(fx.company().treasury()).await.unwrap()), Some(fx.id));
    assert_eq!(found(service.company_by_account(pool).await.unwrap()), Some(fx.id));
    assert_eq!(found(service.company_by_account(levy).await.unwrap()), None);
    assert!(!service.does_own_account(&fx.company(), wallet).await.unwrap());
    assert!(service.is_invited(target, fx.id).await.unwrap());
    assert_eq!(
        service.membership_status(fx.id, target).await.unwrap(),
        MembershipStatus::Invited
    );
}

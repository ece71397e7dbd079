use std::collections::HashSet;
use std::sync::Arc;

use sea_orm::Database;

use engine::{
    AccessPolicy, AccountKind, DrinkTarget, Engine, EngineError, MoneyCents, Principal,
};
use migration::MigratorTrait;

async fn engine_with_db() -> Engine {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    Engine::builder()
        .database(db)
        .policy(AccessPolicy::default())
        .build()
        .await
        .unwrap()
}

fn principal(username: &str, groups: &[&str]) -> Principal {
    Principal::new(username, groups.iter().map(|g| g.to_string()))
}

fn admin(username: &str) -> Principal {
    principal(username, &["admins"])
}

fn member(username: &str) -> Principal {
    principal(username, &["members"])
}

/// Provisions an activated postpaid account.
async fn activated_postpaid(engine: &Engine, username: &str) {
    engine.ensure_postpaid_user(username).await.unwrap();
    engine
        .toggle_activated(&admin("kassenwart"), AccountKind::Postpaid, username)
        .await
        .unwrap();
}

#[tokio::test]
async fn ensure_postpaid_user_is_idempotent_and_starts_deactivated() {
    let engine = engine_with_db().await;

    let first = engine.ensure_postpaid_user("alice").await.unwrap();
    assert_eq!(first.username, "alice");
    assert_eq!(first.money, MoneyCents::ZERO);
    assert!(!first.activated);
    assert!(first.last_drink.is_none());

    let second = engine.ensure_postpaid_user("alice").await.unwrap();
    assert_eq!(second.id, first.id);
}

#[tokio::test]
async fn postpaid_drink_debits_and_stamps_last_drink() {
    let engine = engine_with_db().await;
    activated_postpaid(&engine, "alice").await;

    let receipt = engine
        .record_drink(
            Some(&principal("alice", &[])),
            DrinkTarget::SelfPostpaid,
            MoneyCents::new(150),
            None,
        )
        .await
        .unwrap();

    assert_eq!(receipt.kind, AccountKind::Postpaid);
    assert_eq!(receipt.money, MoneyCents::new(-150));
    assert!(receipt.last_drink.is_some());
}

#[tokio::test]
async fn deactivated_accounts_cannot_drink_regardless_of_balance() {
    let engine = engine_with_db().await;
    engine.ensure_postpaid_user("alice").await.unwrap();
    engine
        .set_postpaid_money(&admin("kassenwart"), "alice", MoneyCents::new(10_000))
        .await
        .unwrap();

    let err = engine
        .record_drink(
            Some(&principal("alice", &[])),
            DrinkTarget::SelfPostpaid,
            MoneyCents::new(100),
            None,
        )
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::Inactive("alice".to_string()));
}

#[tokio::test]
async fn drink_requires_a_principal_or_a_key() {
    let engine = engine_with_db().await;

    let err = engine
        .record_drink(None, DrinkTarget::SelfPostpaid, MoneyCents::new(100), None)
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::Unauthorized);

    let err = engine
        .record_drink(
            None,
            DrinkTarget::ByKey("no-such-key".to_string()),
            MoneyCents::new(100),
            None,
        )
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::KeyNotFound("unknown key".to_string()));
}

#[tokio::test]
async fn add_prepaid_user_requires_membership() {
    let engine = engine_with_db().await;
    engine.ensure_postpaid_user("bob").await.unwrap();

    let err = engine
        .add_prepaid_user(&principal("bob", &[]), "gast", MoneyCents::new(500))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::Forbidden("membership group required".to_string())
    );

    let created = engine
        .add_prepaid_user(&member("bob"), "gast", MoneyCents::new(500))
        .await
        .unwrap();
    assert_eq!(created.money, MoneyCents::new(500));
    assert!(created.activated);

    let err = engine
        .add_prepaid_user(&member("bob"), "gast", MoneyCents::ZERO)
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::ExistingKey("gast".to_string()));
}

#[tokio::test]
async fn prepaid_drink_by_key_allows_overdraft() {
    let engine = engine_with_db().await;
    engine.ensure_postpaid_user("bob").await.unwrap();
    let guest = engine
        .add_prepaid_user(&member("bob"), "gast", MoneyCents::new(100))
        .await
        .unwrap();

    let receipt = engine
        .record_drink(
            None,
            DrinkTarget::ByKey(guest.user_key.clone()),
            MoneyCents::new(150),
            None,
        )
        .await
        .unwrap();

    assert_eq!(receipt.kind, AccountKind::Prepaid);
    assert_eq!(receipt.money, MoneyCents::new(-50));
}

#[tokio::test]
async fn top_up_then_drink_restores_the_previous_balance() {
    let engine = engine_with_db().await;
    engine.ensure_postpaid_user("bob").await.unwrap();
    let guest = engine
        .add_prepaid_user(&member("bob"), "gast", MoneyCents::new(300))
        .await
        .unwrap();

    engine
        .add_prepaid_money(&member("bob"), "gast", MoneyCents::new(250))
        .await
        .unwrap();
    let receipt = engine
        .record_drink(
            None,
            DrinkTarget::ByKey(guest.user_key.clone()),
            MoneyCents::new(250),
            None,
        )
        .await
        .unwrap();

    assert_eq!(receipt.money, MoneyCents::new(300));
}

#[tokio::test]
async fn prepaid_top_up_is_owner_or_admin_only() {
    let engine = engine_with_db().await;
    engine.ensure_postpaid_user("bob").await.unwrap();
    engine.ensure_postpaid_user("mallory").await.unwrap();
    engine
        .add_prepaid_user(&member("bob"), "gast", MoneyCents::ZERO)
        .await
        .unwrap();

    let err = engine
        .add_prepaid_money(&member("mallory"), "gast", MoneyCents::new(100))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::Forbidden("prepaid user not owned by caller".to_string())
    );

    let topped = engine
        .add_prepaid_money(&admin("kassenwart"), "gast", MoneyCents::new(100))
        .await
        .unwrap();
    assert_eq!(topped.money, MoneyCents::new(100));
}

#[tokio::test]
async fn pay_up_transfers_and_conserves_money() {
    let engine = engine_with_db().await;
    let kassenwart = admin("kassenwart");
    engine.ensure_postpaid_user("kassenwart").await.unwrap();
    activated_postpaid(&engine, "alice").await;
    engine
        .set_postpaid_money(&kassenwart, "kassenwart", MoneyCents::new(1000))
        .await
        .unwrap();

    engine
        .record_drink(
            Some(&principal("alice", &[])),
            DrinkTarget::SelfPostpaid,
            MoneyCents::new(150),
            None,
        )
        .await
        .unwrap();

    engine
        .pay_up(&kassenwart, "alice", MoneyCents::new(500))
        .await
        .unwrap();

    let users = engine.list_postpaid_users(&kassenwart).await.unwrap();
    let balance = |name: &str| {
        users
            .iter()
            .find(|u| u.username == name)
            .map(|u| u.money)
            .unwrap()
    };
    assert_eq!(balance("kassenwart"), MoneyCents::new(500));
    assert_eq!(balance("alice"), MoneyCents::new(350));
    assert_eq!(
        balance("kassenwart") + balance("alice"),
        MoneyCents::new(1000) + MoneyCents::new(-150)
    );
}

#[tokio::test]
async fn pay_up_to_unknown_target_changes_nothing() {
    let engine = engine_with_db().await;
    let kassenwart = admin("kassenwart");
    engine.ensure_postpaid_user("kassenwart").await.unwrap();
    engine
        .set_postpaid_money(&kassenwart, "kassenwart", MoneyCents::new(1000))
        .await
        .unwrap();

    let err = engine
        .pay_up(&kassenwart, "nobody", MoneyCents::new(500))
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::KeyNotFound("nobody".to_string()));

    let me = engine.postpaid_self(&kassenwart).await.unwrap();
    assert_eq!(me.money, MoneyCents::new(1000));
}

#[tokio::test]
async fn pay_up_to_self_is_a_neutral_no_op() {
    let engine = engine_with_db().await;
    let kassenwart = admin("kassenwart");
    engine.ensure_postpaid_user("kassenwart").await.unwrap();
    engine
        .set_postpaid_money(&kassenwart, "kassenwart", MoneyCents::new(1000))
        .await
        .unwrap();

    engine
        .pay_up(&kassenwart, "kassenwart", MoneyCents::new(500))
        .await
        .unwrap();

    let me = engine.postpaid_self(&kassenwart).await.unwrap();
    assert_eq!(me.money, MoneyCents::new(1000));
}

#[tokio::test]
async fn pay_up_is_admin_only() {
    let engine = engine_with_db().await;
    engine.ensure_postpaid_user("bob").await.unwrap();
    engine.ensure_postpaid_user("alice").await.unwrap();

    let err = engine
        .pay_up(&member("bob"), "alice", MoneyCents::new(100))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::Forbidden("administrative group required".to_string())
    );
}

#[tokio::test]
async fn set_postpaid_money_is_absolute() {
    let engine = engine_with_db().await;
    let kassenwart = admin("kassenwart");
    activated_postpaid(&engine, "alice").await;
    engine
        .record_drink(
            Some(&principal("alice", &[])),
            DrinkTarget::SelfPostpaid,
            MoneyCents::new(100),
            None,
        )
        .await
        .unwrap();

    let updated = engine
        .set_postpaid_money(&kassenwart, "alice", MoneyCents::new(42))
        .await
        .unwrap();
    assert_eq!(updated.money, MoneyCents::new(42));
}

#[tokio::test]
async fn toggling_a_prepaid_account_blocks_its_key() {
    let engine = engine_with_db().await;
    let kassenwart = admin("kassenwart");
    engine.ensure_postpaid_user("bob").await.unwrap();
    let guest = engine
        .add_prepaid_user(&member("bob"), "gast", MoneyCents::new(500))
        .await
        .unwrap();

    let activated = engine
        .toggle_activated(&kassenwart, AccountKind::Prepaid, "gast")
        .await
        .unwrap();
    assert!(!activated);

    let err = engine
        .record_drink(
            None,
            DrinkTarget::ByKey(guest.user_key.clone()),
            MoneyCents::new(100),
            None,
        )
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::Inactive("gast".to_string()));

    let activated = engine
        .toggle_activated(&kassenwart, AccountKind::Prepaid, "gast")
        .await
        .unwrap();
    assert!(activated);
    engine
        .record_drink(
            None,
            DrinkTarget::ByKey(guest.user_key),
            MoneyCents::new(100),
            None,
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn deleting_a_prepaid_user_kills_and_retires_its_key() {
    let engine = engine_with_db().await;
    let kassenwart = admin("kassenwart");
    engine.ensure_postpaid_user("bob").await.unwrap();
    let guest = engine
        .add_prepaid_user(&member("bob"), "gast", MoneyCents::new(500))
        .await
        .unwrap();
    let old_key = guest.user_key.clone();

    engine
        .delete_prepaid_user(&kassenwart, "gast")
        .await
        .unwrap();

    let err = engine
        .record_drink(
            None,
            DrinkTarget::ByKey(old_key.clone()),
            MoneyCents::new(100),
            None,
        )
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::KeyNotFound("unknown key".to_string()));

    // Recreating accounts never resurrects the old key.
    let mut seen = HashSet::new();
    for i in 0..20 {
        let fresh = engine
            .add_prepaid_user(&member("bob"), &format!("gast{i}"), MoneyCents::ZERO)
            .await
            .unwrap();
        assert_ne!(fresh.user_key, old_key);
        assert!(seen.insert(fresh.user_key));
    }
}

#[tokio::test]
async fn delete_prepaid_user_is_admin_only() {
    let engine = engine_with_db().await;
    engine.ensure_postpaid_user("bob").await.unwrap();
    engine
        .add_prepaid_user(&member("bob"), "gast", MoneyCents::ZERO)
        .await
        .unwrap();

    let err = engine
        .delete_prepaid_user(&member("bob"), "gast")
        .await
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::Forbidden("administrative group required".to_string())
    );
}

#[tokio::test]
async fn ledgers_list_in_insertion_order() {
    let engine = engine_with_db().await;
    let kassenwart = admin("kassenwart");
    engine.ensure_postpaid_user("zeta").await.unwrap();
    engine.ensure_postpaid_user("anna").await.unwrap();
    engine.ensure_postpaid_user("mike").await.unwrap();

    let users = engine.list_postpaid_users(&kassenwart).await.unwrap();
    let names: Vec<&str> = users.iter().map(|u| u.username.as_str()).collect();
    assert_eq!(names, vec!["zeta", "anna", "mike"]);
}

#[tokio::test]
async fn owner_sees_only_their_own_prepaid_users() {
    let engine = engine_with_db().await;
    engine.ensure_postpaid_user("bob").await.unwrap();
    engine.ensure_postpaid_user("carol").await.unwrap();
    engine
        .add_prepaid_user(&member("bob"), "bobs-gast", MoneyCents::ZERO)
        .await
        .unwrap();
    engine
        .add_prepaid_user(&member("carol"), "carols-gast", MoneyCents::ZERO)
        .await
        .unwrap();

    let own = engine
        .prepaid_users_for_owner(&member("bob"))
        .await
        .unwrap();
    assert_eq!(own.len(), 1);
    assert_eq!(own[0].username, "bobs-gast");
}

#[tokio::test]
async fn revert_refunds_only_within_the_window() {
    let engine = engine_with_db().await;
    activated_postpaid(&engine, "alice").await;
    let alice = principal("alice", &[]);

    // Nothing to revert yet.
    let err = engine
        .revert_last_drink(Some(&alice), DrinkTarget::SelfPostpaid, MoneyCents::new(100))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::KeyNotFound("no recent drink to revert".to_string())
    );

    engine
        .record_drink(
            Some(&alice),
            DrinkTarget::SelfPostpaid,
            MoneyCents::new(100),
            None,
        )
        .await
        .unwrap();

    let balance = engine
        .revert_last_drink(Some(&alice), DrinkTarget::SelfPostpaid, MoneyCents::new(100))
        .await
        .unwrap();
    assert_eq!(balance, MoneyCents::ZERO);

    // The stamp is cleared, so the refund cannot be replayed.
    let err = engine
        .revert_last_drink(Some(&alice), DrinkTarget::SelfPostpaid, MoneyCents::new(100))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::KeyNotFound("no recent drink to revert".to_string())
    );
}

#[tokio::test]
async fn drink_with_type_updates_the_catalog_tally() {
    let engine = engine_with_db().await;
    let kassenwart = admin("kassenwart");
    activated_postpaid(&engine, "alice").await;

    let spezi = engine
        .list_drink_types()
        .await
        .unwrap()
        .into_iter()
        .find(|d| d.name == "Paulaner Spezi")
        .unwrap();
    engine
        .set_drink_type_quantity(&kassenwart, spezi.id, 24)
        .await
        .unwrap();

    engine
        .record_drink(
            Some(&principal("alice", &[])),
            DrinkTarget::SelfPostpaid,
            MoneyCents::new(100),
            Some(spezi.id),
        )
        .await
        .unwrap();

    let after = engine
        .list_drink_types()
        .await
        .unwrap()
        .into_iter()
        .find(|d| d.id == spezi.id)
        .unwrap();
    assert_eq!(after.quantity, 23);
    assert_eq!(after.consumed, spezi.consumed + 1);
}

#[tokio::test]
async fn unknown_drink_type_rejects_the_whole_purchase() {
    let engine = engine_with_db().await;
    activated_postpaid(&engine, "alice").await;

    let err = engine
        .record_drink(
            Some(&principal("alice", &[])),
            DrinkTarget::SelfPostpaid,
            MoneyCents::new(100),
            Some(9999),
        )
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::KeyNotFound("drink type 9999".to_string()));

    // The debit was rolled back together with the failed tally.
    let me = engine
        .postpaid_self(&principal("alice", &[]))
        .await
        .unwrap();
    assert_eq!(me.money, MoneyCents::ZERO);
    assert!(me.last_drink.is_none());
}

#[tokio::test]
async fn interleaved_drinks_never_lose_an_update() {
    let engine = Arc::new(engine_with_db().await);
    engine.ensure_postpaid_user("bob").await.unwrap();
    let guest = engine
        .add_prepaid_user(&member("bob"), "gast", MoneyCents::new(5000))
        .await
        .unwrap();

    let mut tasks = tokio::task::JoinSet::new();
    for _ in 0..20 {
        let engine = Arc::clone(&engine);
        let key = guest.user_key.clone();
        tasks.spawn(async move {
            engine
                .record_drink(None, DrinkTarget::ByKey(key), MoneyCents::new(100), None)
                .await
        });
    }
    while let Some(result) = tasks.join_next().await {
        result.unwrap().unwrap();
    }

    let after = engine
        .add_prepaid_money(&member("bob"), "gast", MoneyCents::ZERO)
        .await
        .unwrap();
    assert_eq!(after.money, MoneyCents::new(5000 - 20 * 100));
}

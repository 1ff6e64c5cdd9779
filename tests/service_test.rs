//! Tests for the catalog and profile service layers.

use chrono::{Duration, Utc};
use tempfile::NamedTempFile;

use strictly_trivia::auth::{AuthError, PasswordHasher, TokenService};
use strictly_trivia::catalog::{BaseStats, LocalizedNames};
use strictly_trivia::{
    Achievement, CatalogError, CatalogService, Creature, ProfileError, ProfileService,
    RoundOutcome, TriviaRepository, UserStats,
};

const SECRET: &[u8] = b"service-test-secret";

fn setup_repository() -> (NamedTempFile, TriviaRepository) {
    let db_file = NamedTempFile::new().expect("Failed to create temp file");
    let db_path = db_file.path().to_str().expect("Invalid path").to_string();
    let repo = TriviaRepository::new(db_path).expect("Failed to create repository");
    repo.run_migrations().expect("Migrations failed");
    (db_file, repo)
}

fn profiles(repo: TriviaRepository) -> ProfileService {
    // Minimum bcrypt cost keeps the tests fast.
    ProfileService::new(
        repo,
        PasswordHasher::new(4),
        TokenService::new(SECRET, Duration::hours(1)),
    )
}

fn creature(id: i32, french: &str, english: &str, types: &[&str]) -> Creature {
    Creature::new(
        id,
        LocalizedNames::new(
            french.to_string(),
            english.to_string(),
            String::new(),
            String::new(),
        ),
        types.iter().map(|t| t.to_string()).collect(),
        BaseStats::new(50, 50, 50, 50, 50, 50),
        None,
    )
}

// ── CatalogService ───────────────────────────────────────────────────

#[test]
fn test_catalog_create_and_get() {
    let (_db, repo) = setup_repository();
    let catalog = CatalogService::new(repo);

    let pikachu = creature(25, "Pikachu", "Pikachu", &["Electric"]);
    catalog.create(pikachu.clone()).expect("Create failed");
    assert_eq!(catalog.get(25).expect("Get failed"), pikachu);

    assert!(matches!(
        catalog.create(pikachu),
        Err(CatalogError::AlreadyExists(25))
    ));
    assert!(matches!(catalog.get(26), Err(CatalogError::NotFound(26))));
}

#[test]
fn test_catalog_rejects_invalid_creatures() {
    let (_db, repo) = setup_repository();
    let catalog = CatalogService::new(repo);

    let nameless = creature(1, "", "Bulbasaur", &["Grass"]);
    assert!(matches!(catalog.create(nameless), Err(CatalogError::Invalid(_))));

    let typeless = creature(1, "Bulbizarre", "Bulbasaur", &[]);
    assert!(matches!(catalog.create(typeless), Err(CatalogError::Invalid(_))));

    let negative = creature(-3, "Bulbizarre", "Bulbasaur", &["Grass"]);
    assert!(matches!(catalog.create(negative), Err(CatalogError::Invalid(_))));
}

#[test]
fn test_catalog_update_uses_path_id() {
    let (_db, repo) = setup_repository();
    let catalog = CatalogService::new(repo);
    catalog
        .create(creature(4, "Salamèche", "Charmander", &["Fire"]))
        .expect("Create failed");

    let updated = catalog
        .update(4, creature(999, "Salamèche", "Charmander", &["Fire", "Dragon"]))
        .expect("Update failed");
    assert_eq!(*updated.id(), 4);
    assert_eq!(updated.types().len(), 2);
    assert!(matches!(catalog.get(999), Err(CatalogError::NotFound(999))));

    assert!(matches!(
        catalog.update(5, creature(5, "Reptincel", "Charmeleon", &["Fire"])),
        Err(CatalogError::NotFound(5))
    ));
}

#[test]
fn test_catalog_delete() {
    let (_db, repo) = setup_repository();
    let catalog = CatalogService::new(repo);
    catalog
        .create(creature(7, "Carapuce", "Squirtle", &["Water"]))
        .expect("Create failed");

    let removed = catalog.delete(7).expect("Delete failed");
    assert_eq!(removed.name().english(), "Squirtle");
    assert!(matches!(catalog.delete(7), Err(CatalogError::NotFound(7))));
}

#[test]
fn test_catalog_import_is_all_or_nothing() {
    let (_db, repo) = setup_repository();
    let catalog = CatalogService::new(repo);

    let batch = vec![
        creature(1, "Bulbizarre", "Bulbasaur", &["Grass"]),
        creature(2, "", "Ivysaur", &["Grass"]),
    ];
    assert!(matches!(catalog.import(&batch), Err(CatalogError::Invalid(_))));
    assert!(matches!(catalog.get(1), Err(CatalogError::NotFound(1))));

    let batch = vec![
        creature(1, "Bulbizarre", "Bulbasaur", &["Grass"]),
        creature(2, "Herbizarre", "Ivysaur", &["Grass"]),
    ];
    assert_eq!(catalog.import(&batch).expect("Import failed"), 2);
}

#[test]
fn test_catalog_round_pool_by_type() {
    let (_db, repo) = setup_repository();
    let catalog = CatalogService::new(repo);
    catalog
        .import(&[
            creature(1, "Bulbizarre", "Bulbasaur", &["Grass", "Poison"]),
            creature(4, "Salamèche", "Charmander", &["Fire"]),
            creature(43, "Mystherbe", "Oddish", &["Grass", "Poison"]),
        ])
        .expect("Import failed");

    let pool = catalog
        .round_pool(Some("Poison".to_string()), 100)
        .expect("Pool failed");
    assert_eq!(pool.iter().map(|c| *c.id()).collect::<Vec<_>>(), vec![1, 43]);

    let everything = catalog.round_pool(None, 100).expect("Pool failed");
    assert_eq!(everything.len(), 3);

    let blank = catalog
        .round_pool(Some("  ".to_string()), 100)
        .expect("Pool failed");
    assert_eq!(blank.len(), 3);
}

// ── ProfileService ───────────────────────────────────────────────────

#[test]
fn test_register_and_login() {
    let (_db, repo) = setup_repository();
    let service = profiles(repo);

    let user = service.register("  red  ", "pikachu").expect("Register failed");
    assert_eq!(user.username(), "red");
    assert_ne!(user.password_hash(), "pikachu");

    let token = service.login("red", "pikachu").expect("Login failed");
    let claims = service.authenticate(&token).expect("Token rejected");
    assert_eq!(*claims.sub(), *user.id());
    assert_eq!(claims.username(), "red");
}

#[test]
fn test_register_rejects_blank_credentials() {
    let (_db, repo) = setup_repository();
    let service = profiles(repo);
    assert!(matches!(
        service.register("   ", "secret"),
        Err(ProfileError::MissingCredentials)
    ));
    assert!(matches!(
        service.register("blue", ""),
        Err(ProfileError::MissingCredentials)
    ));
}

#[test]
fn test_register_duplicate_username() {
    let (_db, repo) = setup_repository();
    let service = profiles(repo);
    service.register("green", "one").expect("Register failed");
    match service.register("green", "two") {
        Err(ProfileError::UsernameTaken(name)) => assert_eq!(name, "green"),
        other => panic!("Expected UsernameTaken, got {other:?}"),
    }
}

#[test]
fn test_login_failures_are_indistinguishable() {
    let (_db, repo) = setup_repository();
    let service = profiles(repo);
    service.register("gold", "silver").expect("Register failed");

    let wrong_password = service.login("gold", "crystal").expect_err("Should fail");
    let unknown_user = service.login("kris", "silver").expect_err("Should fail");
    assert_eq!(wrong_password.to_string(), unknown_user.to_string());
    assert!(matches!(
        wrong_password,
        ProfileError::Auth(AuthError::InvalidCredentials)
    ));
    assert!(matches!(
        unknown_user,
        ProfileError::Auth(AuthError::InvalidCredentials)
    ));
}

#[test]
fn test_authenticate_rejects_foreign_and_expired_tokens() {
    let (_db, repo) = setup_repository();
    let service = profiles(repo);

    let foreign = TokenService::new(b"someone-else", Duration::hours(1))
        .issue(1, "mallory")
        .expect("Issue failed");
    assert!(matches!(
        service.authenticate(&foreign),
        Err(ProfileError::Auth(AuthError::MalformedToken))
    ));

    let stale = service
        .tokens()
        .issue_at(1, "red", Utc::now() - Duration::days(2))
        .expect("Issue failed");
    assert!(matches!(
        service.authenticate(&stale),
        Err(ProfileError::Auth(AuthError::ExpiredToken))
    ));
}

#[test]
fn test_profile_of_new_account() {
    let (_db, repo) = setup_repository();
    let service = profiles(repo);
    let user = service.register("ethan", "lyra").expect("Register failed");

    let profile = service.profile(*user.id()).expect("Profile failed");
    assert_eq!(profile.user().username(), "ethan");
    assert_eq!(*profile.stats(), UserStats::default());
    assert!(profile.achievements().is_empty());

    assert!(matches!(
        service.profile(9999),
        Err(ProfileError::UserNotFound(9999))
    ));
}

#[test]
fn test_record_round_folds_into_stored_stats() {
    let (_db, repo) = setup_repository();
    let service = profiles(repo.clone());
    let user = service.register("may", "torchic").expect("Register failed");
    let user_id = *user.id();

    let first = service
        .record_round(user_id, &RoundOutcome::new(true, 3, 8))
        .expect("Record failed");
    assert_eq!(*first.total_score(), 8);
    assert_eq!(*first.winrate(), 33);
    assert!(first.last_game_date().is_some());

    let second = service
        .record_round(user_id, &RoundOutcome::new(false, 2, 0))
        .expect("Record failed");
    assert_eq!(*second.total_attempts(), 5);
    assert_eq!(*second.streak_correct(), 0);
    assert_eq!(*second.best_streak(), 1);
    assert_eq!(*second.winrate(), 20);

    let (stored, version) = repo
        .load_stats(user_id)
        .expect("Load failed")
        .expect("Stats row should exist");
    assert_eq!(stored, second);
    assert_eq!(version, 2);
}

#[test]
fn test_record_round_for_unknown_user() {
    let (_db, repo) = setup_repository();
    let service = profiles(repo);
    assert!(matches!(
        service.record_round(77, &RoundOutcome::new(true, 1, 10)),
        Err(ProfileError::UserNotFound(77))
    ));
}

#[test]
fn test_profile_lists_earned_achievements() {
    let (_db, repo) = setup_repository();
    let service = profiles(repo);
    let user = service.register("brendan", "mudkip").expect("Register failed");

    for _ in 0..5 {
        service
            .record_round(*user.id(), &RoundOutcome::new(true, 1, 10))
            .expect("Record failed");
    }

    let profile = service.profile(*user.id()).expect("Profile failed");
    assert_eq!(
        *profile.achievements(),
        vec![
            Achievement::Sharpshooter,
            Achievement::OnFire,
            Achievement::Lightning,
        ]
    );
}

#[test]
fn test_concurrent_recording_loses_no_rounds() {
    let (_db, repo) = setup_repository();
    let service = profiles(repo);
    let user = service.register("wally", "ralts").expect("Register failed");
    let user_id = *user.id();

    let handles: Vec<_> = (0..3)
        .map(|_| {
            let service = service.clone();
            std::thread::spawn(move || {
                service.record_round(user_id, &RoundOutcome::new(true, 1, 10))
            })
        })
        .collect();
    for handle in handles {
        handle
            .join()
            .expect("Thread panicked")
            .expect("Record failed");
    }

    let profile = service.profile(user_id).expect("Profile failed");
    assert_eq!(*profile.stats().correct_answers(), 3);
    assert_eq!(*profile.stats().total_score(), 30);
}

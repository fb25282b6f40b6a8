//! Integration tests for `DieselProfileRepository` against embedded PostgreSQL.
//!
//! Each test gets its own cluster and a database migrated through
//! `run_pending_migrations`, then drives the repository port on a dedicated
//! Tokio runtime.

use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};
use pg_embedded_setup_unpriv::TestCluster;
use profile_backend::domain::ports::{ProfileRepository, ProfileRepositoryError};
use profile_backend::domain::{
    CreationWindow, Profile, ProfileCategory, ProfileCreateRequest, ProfileProperties,
};
use profile_backend::outbound::persistence::{DbPool, DieselProfileRepository, PoolConfig};
use profile_backend::test_support::{MutableClock, email, fixture_timestamp};
use rstest::{fixture, rstest};
use serde_json::json;
use tokio::runtime::Runtime;

mod support;

use support::{handle_cluster_setup_failure, provision_database, test_cluster};

struct TestContext {
    runtime: Runtime,
    _cluster: TestCluster,
    clock: Arc<MutableClock>,
    repository: DieselProfileRepository,
}

impl TestContext {
    fn save(&self, profile: Profile) -> Result<Profile, ProfileRepositoryError> {
        self.runtime.block_on(self.repository.save(profile))
    }

    fn insert(&self, profile: Profile) -> Profile {
        self.save(profile).expect("insert profile")
    }
}

fn setup_context() -> Result<TestContext, String> {
    let runtime = Runtime::new().map_err(|err| err.to_string())?;
    let cluster = test_cluster()?;
    let database_url = provision_database(&cluster)?;

    let config = PoolConfig::new(&database_url)
        .with_max_size(2)
        .with_min_idle(Some(1));
    let pool = runtime
        .block_on(DbPool::new(config))
        .map_err(|err| err.to_string())?;
    let clock = Arc::new(MutableClock::at_fixture_time());
    let repository = DieselProfileRepository::new(pool, clock.clone());

    Ok(TestContext {
        runtime,
        _cluster: cluster,
        clock,
        repository,
    })
}

#[fixture]
fn repo_context() -> Option<TestContext> {
    match setup_context() {
        Ok(context) => Some(context),
        Err(reason) => handle_cluster_setup_failure(reason),
    }
}

fn unsaved(raw_email: &str, created: DateTime<Utc>) -> Profile {
    Profile::builder(email(raw_email), created)
        .first_name("Grace")
        .last_name("Hopper")
        .phone(Some("555-0100".to_owned()))
        .properties([("skill", json!("COBOL")), ("rank", json!(3))].into_iter().collect())
        .build()
}

#[rstest]
fn insert_assigns_id_and_round_trips(repo_context: Option<TestContext>) {
    let Some(context) = repo_context else {
        eprintln!("SKIP-TEST-CLUSTER: insert_assigns_id_and_round_trips skipped");
        return;
    };

    let profile = unsaved("grace@example.com", fixture_timestamp());
    let inserted = context.insert(profile.clone());

    let id = *inserted.id().expect("store assigns an id");
    assert_eq!(inserted, profile.with_id(id));

    let fetched = context
        .runtime
        .block_on(context.repository.find_by_email(&email("grace@example.com")))
        .expect("lookup")
        .expect("profile stored");
    assert_eq!(fetched, inserted);

    let projection = context
        .runtime
        .block_on(
            context
                .repository
                .find_projection_by_email(&email("grace@example.com")),
        )
        .expect("projection lookup")
        .expect("projection stored");
    assert_eq!(projection.full_name, "Grace Hopper");
    assert_eq!(projection.id, Some(id));
}

#[rstest]
fn update_overwrites_row_and_keeps_creation_date(repo_context: Option<TestContext>) {
    let Some(context) = repo_context else {
        eprintln!("SKIP-TEST-CLUSTER: update_overwrites_row_and_keeps_creation_date skipped");
        return;
    };

    let inserted = context.insert(unsaved("grace@example.com", fixture_timestamp()));
    let mut changed = inserted.clone();
    changed.merge_properties([("rank", json!("admiral"))].into_iter().collect());

    let updated = context.save(changed.clone()).expect("update profile");
    assert_eq!(updated, changed);

    let all = context
        .runtime
        .block_on(context.repository.find_all())
        .expect("list");
    assert_eq!(all, vec![changed]);
    assert_eq!(all[0].creation_date(), fixture_timestamp());
}

#[rstest]
fn duplicate_email_maps_unique_violation(repo_context: Option<TestContext>) {
    let Some(context) = repo_context else {
        eprintln!("SKIP-TEST-CLUSTER: duplicate_email_maps_unique_violation skipped");
        return;
    };

    context.insert(unsaved("grace@example.com", fixture_timestamp()));
    let error = context
        .save(unsaved("grace@example.com", fixture_timestamp()))
        .expect_err("second insert violates profiles_email_key");
    assert_eq!(
        error,
        ProfileRepositoryError::duplicate_email("grace@example.com")
    );

    let other = context.insert(unsaved("ada@example.com", fixture_timestamp()));
    let mut stolen = other.clone();
    stolen.apply_request(&ProfileCreateRequest::for_email(email("grace@example.com")));
    let error = context.save(stolen).expect_err("update onto a taken email");
    assert_eq!(
        error,
        ProfileRepositoryError::duplicate_email("grace@example.com")
    );
}

#[rstest]
#[case::email("GRACE@", true)]
#[case::last_name("hopp", true)]
#[case::phone("0100", true)]
#[case::string_property("cobol", true)]
#[case::numeric_property("3", true)]
#[case::property_key("skill", false)]
#[case::json_syntax("{", false)]
#[case::like_wildcard("%", false)]
#[case::absent("fortran", false)]
fn search_matches_fields_and_property_values(
    repo_context: Option<TestContext>,
    #[case] term: &str,
    #[case] expected: bool,
) {
    let Some(context) = repo_context else {
        eprintln!("SKIP-TEST-CLUSTER: search_matches_fields_and_property_values skipped");
        return;
    };

    context.insert(unsaved("grace@example.com", fixture_timestamp()));

    let matches = context
        .runtime
        .block_on(context.repository.search(term))
        .expect("search");
    assert_eq!(!matches.is_empty(), expected, "term {term:?}");
}

#[rstest]
fn creation_window_query_is_half_open(repo_context: Option<TestContext>) {
    let Some(context) = repo_context else {
        eprintln!("SKIP-TEST-CLUSTER: creation_window_query_is_half_open skipped");
        return;
    };

    let window = CreationWindow::month_containing(fixture_timestamp()).expect("window");
    context.insert(unsaved("inside@example.com", window.start()));
    context.insert(unsaved("outside@example.com", window.end()));

    let found = context
        .runtime
        .block_on(context.repository.find_by_creation_date_between(&window))
        .expect("window query");
    let emails: Vec<&str> = found.iter().map(|p| p.email().as_ref()).collect();
    assert_eq!(emails, vec!["inside@example.com"]);
}

#[rstest]
fn calendar_counts_follow_the_clock(repo_context: Option<TestContext>) {
    let Some(context) = repo_context else {
        eprintln!("SKIP-TEST-CLUSTER: calendar_counts_follow_the_clock skipped");
        return;
    };

    let now = fixture_timestamp();
    for (index, age_days) in [0_i64, 20, 60, 400].into_iter().enumerate() {
        let created = now - TimeDelta::days(age_days);
        context.insert(unsaved(&format!("p{index}@example.com"), created));
    }

    let repository = &context.repository;
    let counts = |runtime: &Runtime| {
        runtime
            .block_on(async {
                tokio::try_join!(
                    repository.count_by_year(),
                    repository.count_by_quarter(),
                    repository.count_by_month(),
                )
            })
            .expect("counts")
    };

    // 2026-02-14: 20 days back is January, 60 is December 2025, 400 is 2025.
    assert_eq!(counts(&context.runtime), (2, 2, 1));

    context.clock.advance(TimeDelta::days(365));
    assert_eq!(counts(&context.runtime), (0, 0, 0));
}

#[rstest]
fn category_counts_ignore_uncategorised(repo_context: Option<TestContext>) {
    let Some(context) = repo_context else {
        eprintln!("SKIP-TEST-CLUSTER: category_counts_ignore_uncategorised skipped");
        return;
    };

    let categories = [
        Some(ProfileCategory::Candidate),
        Some(ProfileCategory::Candidate),
        Some(ProfileCategory::Consultant),
        None,
    ];
    for (index, category) in categories.into_iter().enumerate() {
        let address = email(&format!("c{index}@example.com"));
        context.insert(
            Profile::builder(address, fixture_timestamp())
                .category(category)
                .properties(ProfileProperties::new())
                .build(),
        );
    }

    let candidates = context
        .runtime
        .block_on(context.repository.count_candidates())
        .expect("candidates");
    let consultants = context
        .runtime
        .block_on(context.repository.count_consultants())
        .expect("consultants");
    assert_eq!((candidates, consultants), (2, 1));
}

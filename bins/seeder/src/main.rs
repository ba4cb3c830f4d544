//! Database seeder for OASYS development and testing.
//!
//! Seeds a demo user and organization with its first fiscal year and
//! periods for local development.
//!
//! Usage: cargo run --bin seeder

use oasys_core::auth::hash_password;
use oasys_core::fiscal::{PeriodGranularity, PriorPeriodPolicy};
use oasys_db::repositories::organization::{CreateOrganizationInput, OrganizationRepository};
use oasys_db::repositories::user::UserRepository;

const DEMO_EMAIL: &str = "demo@oasys.dev";
const DEMO_PASSWORD: &str = "demo-password";
const DEMO_SLUG: &str = "demo-company";

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let database_url =
        std::env::var("DATABASE_URL").expect("DATABASE_URL must be set in environment");

    println!("Connecting to database...");
    let db = oasys_db::connect(&database_url)
        .await
        .expect("Failed to connect to database");

    let user_repo = UserRepository::new(db.clone());
    let org_repo = OrganizationRepository::new(db.clone());

    println!("Seeding demo user...");
    let user = match user_repo
        .find_by_email(DEMO_EMAIL)
        .await
        .expect("Failed to query users")
    {
        Some(existing) => {
            println!("  Demo user already exists, skipping...");
            existing
        }
        None => {
            let password_hash = hash_password(DEMO_PASSWORD).expect("Failed to hash password");
            user_repo
                .create(DEMO_EMAIL, &password_hash, "Demo User")
                .await
                .expect("Failed to create demo user")
        }
    };

    println!("Seeding demo organization...");
    if org_repo
        .slug_exists(DEMO_SLUG)
        .await
        .expect("Failed to query organizations")
    {
        println!("  Demo organization already exists, skipping...");
    } else {
        let input = CreateOrganizationInput {
            name: "Demo Company".to_string(),
            slug: DEMO_SLUG.to_string(),
            base_currency: "USD".to_string(),
            timezone: "UTC".to_string(),
            fiscal_year_start: "01-01".to_string(),
            granularity: PeriodGranularity::Monthly,
            auto_lock_on_close: true,
            require_audit_before_close: false,
            prior_period_policy: PriorPeriodPolicy::Deny,
        };

        let today = chrono::Utc::now().date_naive();
        let (org, fiscal_year) = org_repo
            .create_with_owner(input, user.id, today)
            .await
            .expect("Failed to create demo organization");

        println!(
            "  Created organization {} with fiscal year {} ({} periods)",
            org.slug,
            fiscal_year.fiscal_year.name,
            fiscal_year.periods.len()
        );
    }

    println!("Seeding complete!");
    println!("  Login: {DEMO_EMAIL} / {DEMO_PASSWORD}");
}

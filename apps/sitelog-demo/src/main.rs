//! End-to-end demo of the interactions core on the in-memory stack.

use serde_json::{Value, json};
use time::{Duration, OffsetDateTime};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use interactions::InteractionsModule;
use interactions_sdk::{InteractionKind, NewInteraction};
use sitelog_query::SearchRequest;
use sitelog_security::{Role, SiteContext, SiteSelector};

fn payload(user_id: Uuid, grants: &[(Uuid, Role)]) -> Value {
    let sites: Vec<Value> = grants
        .iter()
        .map(|(site_id, role)| json!({ "site_id": site_id.to_string(), "role": role.as_str() }))
        .collect();
    json!({
        "sub": user_id.to_string(),
        "sites": sites,
        "exp": (OffsetDateTime::now_utc() + Duration::hours(1)).unix_timestamp(),
    })
}

fn meeting(subject: &str, claimed_site: Option<Uuid>) -> NewInteraction {
    let starts_at = OffsetDateTime::now_utc();
    NewInteraction {
        site_id: claimed_site,
        subject: subject.to_owned(),
        kind: InteractionKind::Meeting,
        lead: "Dana Feld".to_owned(),
        starts_at,
        ends_at: starts_at + Duration::hours(1),
        timezone: "Europe/Berlin".to_owned(),
        location: "Berlin office".to_owned(),
        description: "Planning session".to_owned(),
        notes: String::new(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let module = InteractionsModule::builder().build();
    let client = module.client();

    let north = Uuid::new_v4();
    let south = Uuid::new_v4();
    let user = Uuid::new_v4();
    tracing::info!(%north, %south, "seeding two sites");

    let north_editor = SiteContext {
        user_id: user,
        site_id: north,
        role: Role::Editor,
    };
    let south_editor = SiteContext {
        user_id: user,
        site_id: south,
        role: Role::Editor,
    };
    for subject in ["Quarterly kickoff", "Kickoff retro", "Budget review"] {
        client.create(north_editor, meeting(subject, None)).await?;
    }
    client
        .create(south_editor, meeting("Board kickoff", None))
        .await?;

    // A crafted payload claiming another site is overridden by the context.
    let forced = client
        .create(south_editor, meeting("Vendor call", Some(north)))
        .await?;
    tracing::info!(persisted_site = %forced.site_id, "payload claimed site {north}, context won");

    // Tenant isolation: matches exist on the north site, none leak south.
    let south_viewer = payload(user, &[(south, Role::Viewer)]);
    let page = client
        .search(&south_viewer, SiteSelector::none(), SearchRequest::text("kickoff"))
        .await?;
    tracing::info!(total = page.total, "south-scoped search for 'kickoff' (north has 2 matches)");

    // Page clamping: the served size is echoed back.
    let north_viewer = payload(user, &[(north, Role::Viewer)]);
    let clamped = client
        .search(
            &north_viewer,
            SiteSelector::none(),
            SearchRequest {
                page_size: Some(5_000),
                ..SearchRequest::default()
            },
        )
        .await?;
    tracing::info!(page_size = clamped.page_size, "requested page size 5000 was clamped");

    // Cache: repeat search hits, a write invalidates the whole site in O(1).
    let request = SearchRequest::text("kickoff");
    let first = client
        .search(&north_viewer, SiteSelector::none(), request.clone())
        .await?;
    let second = client
        .search(&north_viewer, SiteSelector::none(), request.clone())
        .await?;
    anyhow::ensure!(first == second, "cache must be transparent");
    client
        .create(north_editor, meeting("Kickoff follow-up", None))
        .await?;
    let third = client
        .search(&north_viewer, SiteSelector::none(), request)
        .await?;
    tracing::info!(
        before = second.total,
        after = third.total,
        stats = ?module.cache_stats(),
        "write invalidated the cached page"
    );

    module.shutdown();
    Ok(())
}

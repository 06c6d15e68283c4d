use anyhow::Context;
use estate_portal::access::{resolve_screen, Gate, Route, Screen};
use estate_portal::view::{CardImage, ClickOutcome, ListingSection, MountHandle};
use estate_portal::{PortalConfig, Stores};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const PORTFOLIO_STATUS: &str = "our portfolio";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = PortalConfig::from_env().context("Failed to load configuration")?;
    info!("🏠 Estate Portal client against {}", config.base_url);

    let stores = Stores::from_config(&config).context("Failed to set up stores")?;

    // Credentials from the environment sign the member in before browsing
    if let (Ok(email), Ok(password)) = (std::env::var("PORTAL_EMAIL"), std::env::var("PORTAL_PASSWORD")) {
        if let Err(e) = stores.session.login(&email, &password).await {
            warn!("Login failed: {}", e.user_message());
        }
    }

    stores.check_sessions().await;
    stores.session.ensure_fresh().await;

    let path = std::env::args().nth(1).unwrap_or_else(|| "/".to_string());
    let session = stores.session.snapshot();
    let screen = resolve_screen(&session, &path);
    info!("Access: {:?}, screen for '{}': {:?}", Gate::evaluate(&session), path, screen);

    let route = match screen {
        Screen::Page(route) => route,
        Screen::Blocked => {
            println!("Your account has been blocked. Please contact the brokerage.");
            return Ok(());
        }
        Screen::AdminLogin => {
            println!("The admin area requires an administrator sign-in.");
            return Ok(());
        }
        Screen::Loading => Route::Home,
    };

    let mut section = ListingSection::new(
        PORTFOLIO_STATUS,
        &route,
        stores.listings.clone(),
        stores.session.clone(),
        MountHandle::mounted(),
    );
    section.load().await;

    let Some(view) = section.view() else {
        warn!("Listings could not be loaded");
        return Ok(());
    };

    let tabs: Vec<&str> = view.tabs.iter().map(|c| c.name.as_str()).collect();
    info!("\n✅ {} listings, categories: {}\n", view.cards.len(), tabs.join(", "));

    for (i, card) in view.cards.iter().enumerate() {
        println!("{}. {} ({} {})", i + 1, card.name, card.price, card.unit);
        if !card.address.is_empty() {
            println!("   {}", card.address);
        }
        match &card.image {
            CardImage::Image(path) => println!("   Image: {}", path),
            CardImage::Placeholder => println!("   Image: (none)"),
        }

        match section.click(card.id) {
            ClickOutcome::Detail(detail) => {
                for line in detail.render_lines().iter().skip(1) {
                    println!("   {}", line);
                }
            }
            ClickOutcome::RegistrationPrompt => println!("   Register to see full details"),
            ClickOutcome::AwaitingApproval => println!("   Details unlock once your account is approved"),
            _ => {}
        }
        println!();
    }

    Ok(())
}

use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;
use phantom_config::PhantomConfig;
use phantom_cursor::options::{ClickOptions, PathOptions, TypeOptions};
use phantom_cursor::path::plan_move;
use phantom_cursor::{create_cursor, Cursor, Vector, Waypoint};
use phantom_drivers::{PhantomDriver, WebDriverPage};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::info;

#[derive(Debug, Clone, Args)]
pub struct PathArgs {
    #[arg(allow_hyphen_values = true)]
    pub from_x: f64,
    #[arg(allow_hyphen_values = true)]
    pub from_y: f64,
    #[arg(allow_hyphen_values = true)]
    pub to_x: f64,
    #[arg(allow_hyphen_values = true)]
    pub to_y: f64,
    /// Target width; larger targets get fewer steps.
    #[arg(long, default_value_t = 0.0)]
    pub width: f64,
    /// Fixed speed instead of a random one.
    #[arg(long)]
    pub speed: Option<f64>,
    #[arg(long)]
    pub timestamps: bool,
    /// Seed for reproducible paths.
    #[arg(long)]
    pub seed: Option<u64>,
}

/// Legs of the planned move, one for a direct move, two with an overshoot.
pub fn plan_path(args: &PathArgs, cfg: &PhantomConfig) -> Vec<Vec<Waypoint>> {
    let movement = &cfg.cursor.movement;
    let options = PathOptions {
        move_speed: args.speed.or(movement.path.move_speed),
        use_timestamps: args.timestamps || movement.path.use_timestamps,
        ..movement.path.clone()
    };
    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    plan_move(
        &mut rng,
        Vector::new(args.from_x, args.from_y),
        Vector::new(args.to_x, args.to_y),
        args.width,
        movement.overshoot_threshold,
        &options,
    )
}

pub fn print_path(args: &PathArgs, cfg: &PhantomConfig) -> Result<()> {
    let legs = plan_path(args, cfg);
    println!("{}", serde_json::to_string_pretty(&legs)?);
    Ok(())
}

pub fn print_defaults(cfg: &PhantomConfig) -> Result<()> {
    print!("{}", serde_yaml::to_string(&cfg.cursor)?);
    Ok(())
}

/// A connected session with a cursor on the opened page.
struct Session {
    driver: PhantomDriver,
    cursor: Cursor<WebDriverPage>,
}

impl Session {
    async fn open(cfg: &PhantomConfig, url: &str, wander: bool) -> Result<Self> {
        let driver = PhantomDriver::connect(&cfg.webdriver)
            .await
            .context("connecting to webdriver")?;
        let page = driver.goto(url).await?;
        let cursor = create_cursor(page, None, wander, cfg.cursor.clone());
        Ok(Self { driver, cursor })
    }

    async fn close(self) -> Result<()> {
        let Session { driver, cursor } = self;
        drop(cursor);
        driver.close().await?;
        Ok(())
    }
}

pub async fn click(cfg: &PhantomConfig, url: &str, selector: &str, count: u32) -> Result<()> {
    let session = Session::open(cfg, url, cfg.random_moves).await?;
    let options = ClickOptions {
        click_count: count,
        ..cfg.cursor.click.clone()
    };
    let outcome = session.cursor.click(Some(selector.into()), Some(options)).await;
    session.close().await?;
    outcome?;
    info!(target: "phantom", %selector, count, "clicked");
    Ok(())
}

pub async fn type_text(
    cfg: &PhantomConfig,
    url: &str,
    selector: &str,
    text: &str,
    mistakes: Option<f64>,
) -> Result<()> {
    let session = Session::open(cfg, url, cfg.random_moves).await?;
    let options = TypeOptions {
        mistake_rate: mistakes.unwrap_or(cfg.cursor.typing.mistake_rate),
        ..cfg.cursor.typing.clone()
    };
    let outcome = session
        .cursor
        .type_text(Some(selector.into()), text, Some(options))
        .await;
    session.close().await?;
    outcome?;
    info!(target: "phantom", %selector, chars = text.chars().count(), "typed");
    Ok(())
}

pub async fn scroll(cfg: &PhantomConfig, url: &str, dx: f64, dy: f64) -> Result<()> {
    let session = Session::open(cfg, url, cfg.random_moves).await?;
    let outcome = session.cursor.scroll(Vector::new(dx, dy), None).await;
    session.close().await?;
    outcome?;
    Ok(())
}

pub async fn wander(cfg: &PhantomConfig, url: &str, seconds: u64) -> Result<()> {
    let session = Session::open(cfg, url, true).await?;
    tokio::time::sleep(Duration::from_secs(seconds)).await;
    info!(
        target: "phantom",
        location = ?session.cursor.location(),
        "wander finished"
    );
    session.close().await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(seed: u64) -> PathArgs {
        PathArgs {
            from_x: 10.0,
            from_y: 10.0,
            to_x: 300.0,
            to_y: 200.0,
            width: 40.0,
            speed: Some(25.0),
            timestamps: true,
            seed: Some(seed),
        }
    }

    #[test]
    fn printed_defaults_read_back() {
        let cfg = PhantomConfig::default();
        let yaml = serde_yaml::to_string(&cfg.cursor).unwrap();
        let decoded: phantom_cursor::DefaultOptions = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(decoded, cfg.cursor);
    }

    #[test]
    fn seeded_paths_are_reproducible() {
        let cfg = PhantomConfig::default();
        let untimed = PathArgs {
            timestamps: false,
            ..args(3)
        };
        assert_eq!(plan_path(&untimed, &cfg), plan_path(&untimed, &cfg));
    }

    #[test]
    fn short_moves_are_a_single_timed_leg() {
        let legs = plan_path(&args(8), &PhantomConfig::default());
        assert_eq!(legs.len(), 1);
        let leg = &legs[0];
        assert_eq!(leg[0].point(), Vector::new(10.0, 10.0));
        assert_eq!(leg[leg.len() - 1].point(), Vector::new(300.0, 200.0));
        assert!(leg.iter().all(|w| w.timestamp.is_some()));
    }

    #[test]
    fn long_moves_overshoot_and_correct() {
        let long = PathArgs {
            to_x: 1200.0,
            to_y: 900.0,
            ..args(21)
        };
        let legs = plan_path(&long, &PhantomConfig::default());
        assert_eq!(legs.len(), 2);
        let last = legs[1].last().unwrap();
        assert_eq!(last.point(), Vector::new(1200.0, 900.0));
    }
}

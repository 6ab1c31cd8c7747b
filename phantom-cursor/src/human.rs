//! One-call helpers for scripts: each is a single cursor action followed by
//! a short human pause.

use std::time::Duration;

use rand::Rng;

use crate::cursor::Cursor;
use crate::error::Result;
use crate::math::Vector;
use crate::options::TypeOptions;
use crate::page::Page;

/// Sleep for a random duration between `min_ms` and `max_ms`.
pub async fn human_delay(min_ms: u64, max_ms: u64) {
    let ms = {
        let (lo, hi) = (min_ms.min(max_ms), min_ms.max(max_ms));
        rand::thread_rng().gen_range(lo..=hi)
    };
    tokio::time::sleep(Duration::from_millis(ms)).await;
}

pub async fn human_click<P: Page>(cursor: &Cursor<P>, selector: &str) -> Result<()> {
    cursor.click(Some(selector.into()), None).await?;
    human_delay(200, 600).await;
    Ok(())
}

pub async fn human_type<P: Page>(cursor: &Cursor<P>, selector: &str, text: &str) -> Result<()> {
    let options = TypeOptions {
        mistake_rate: 0.0,
        ..cursor.defaults().typing.clone()
    };
    cursor.type_text(Some(selector.into()), text, Some(options)).await?;
    human_delay(300, 800).await;
    Ok(())
}

/// Like [`human_type`], occasionally hitting a neighbouring key and fixing it.
pub async fn human_type_with_mistakes<P: Page>(
    cursor: &Cursor<P>,
    selector: &str,
    text: &str,
    mistake_rate: f64,
) -> Result<()> {
    let options = TypeOptions {
        mistake_rate,
        ..cursor.defaults().typing.clone()
    };
    cursor.type_text(Some(selector.into()), text, Some(options)).await?;
    human_delay(300, 800).await;
    Ok(())
}

/// Scroll vertically by `delta_y` pixels; negative scrolls up.
pub async fn human_scroll<P: Page>(cursor: &Cursor<P>, delta_y: f64) -> Result<()> {
    cursor.scroll(Vector::new(0.0, delta_y), None).await?;
    human_delay(400, 1200).await;
    Ok(())
}

pub async fn human_hover<P: Page>(cursor: &Cursor<P>, selector: &str) -> Result<()> {
    cursor.move_to(selector, None).await?;
    human_delay(500, 1500).await;
    Ok(())
}

pub async fn human_scroll_to_element<P: Page>(cursor: &Cursor<P>, selector: &str) -> Result<()> {
    cursor.scroll_into_view(selector, None).await?;
    human_delay(300, 900).await;
    Ok(())
}

pub async fn human_mouse_move<P: Page>(cursor: &Cursor<P>, x: f64, y: f64) -> Result<()> {
    cursor.move_to_point(Vector::new(x, y), None).await?;
    human_delay(100, 400).await;
    Ok(())
}

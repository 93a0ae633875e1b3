use crate::browser::RenderSession;
use crate::error::Result;
use crate::interaction::config::ScrollConfig;
use crate::interaction::outcome::ScrollOutcome;
use std::time::Duration;

/// Scrolls in fixed steps until the step budget runs out or the page height
/// stays unchanged for `stability_passes` consecutive steps.
pub(crate) async fn apply<S: RenderSession>(
    session: &S,
    config: &ScrollConfig,
) -> Result<ScrollOutcome> {
    let delay = Duration::from_millis(config.delay_ms);
    let stability_passes = config.stability_passes.max(1);

    let mut previous = session.scroll_height().await?;
    let mut stable = 0;
    let mut performed = 0;

    for _ in 0..config.max_steps {
        session.scroll_by(config.step_px).await?;
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        let height = session.scroll_height().await?;
        performed += 1;

        if height == previous {
            if config.stop_if_no_dom_change {
                stable += 1;
                if stable >= stability_passes {
                    break;
                }
            }
        } else {
            stable = 0;
        }
        previous = height;
    }

    Ok(ScrollOutcome {
        performed_steps: performed,
        final_height: previous,
        stopped_for_stability: config.stop_if_no_dom_change && stable >= stability_passes,
    })
}

// sequence.rs
use std::time::Duration;

use rand::seq::SliceRandom;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::{Outcome, dispatch_all};
use crate::{color::Color, config::DanceSettings, devices::DeviceHandle};

pub const DANCE_PALETTE: [Color; 13] = [
    Color::from_u32(0xff80ed),
    Color::from_u32(0x00ffff),
    Color::from_u32(0x00ff00),
    Color::from_u32(0x0000ff),
    Color::from_u32(0xff0000),
    Color::from_u32(0xff00ff),
    Color::from_u32(0xf6546a),
    Color::from_u32(0xff1493),
    Color::from_u32(0xff7373),
    Color::from_u32(0x660066),
    Color::from_u32(0x66cdaa),
    Color::from_u32(0xfff68f),
    Color::from_u32(0xffd700),
];

pub const UKRAINE_YELLOW: Color = Color::from_u32(0xFFD500);
pub const UKRAINE_BLUE: Color = Color::from_u32(0x005BBB);

const MIN_TICK: Duration = Duration::from_millis(1);

/// How long an animation runs and how far apart its ticks are.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    pub duration: Duration,
    pub tick: Duration,
}

impl Timing {
    pub fn new(duration: Duration, tick: Duration) -> Self {
        Self {
            duration,
            tick: tick.max(MIN_TICK),
        }
    }
}

impl From<&DanceSettings> for Timing {
    fn from(settings: &DanceSettings) -> Self {
        Self::new(
            Duration::from_secs(settings.duration_secs),
            Duration::from_millis(settings.tick_ms),
        )
    }
}

/// Picks uniformly from `palette`; an empty palette yields random colors.
pub fn random_from(palette: Vec<Color>) -> impl FnMut() -> Color + Send {
    move || {
        palette
            .choose(&mut rand::thread_rng())
            .copied()
            .unwrap_or_else(Color::random)
    }
}

/// Positions 1 and 2 get `primary`, position 3 gets `secondary`, everything
/// after that is left alone.
pub fn two_tone(primary: Color, secondary: Color) -> impl Fn(usize) -> Option<Color> + Send + Sync {
    move |index| match index {
        1 | 2 => Some(primary),
        3 => Some(secondary),
        _ => None,
    }
}

/// One fan-out where each device's color depends on its position.
pub async fn paint_by_index<A>(
    targets: Vec<DeviceHandle>,
    cancel: &CancellationToken,
    assign: A,
) -> Vec<Outcome>
where
    A: Fn(usize) -> Option<Color>,
{
    dispatch_all(targets, cancel, |index, handle| {
        let color = assign(index);
        async move {
            match color {
                Some(color) => handle.set_color(color).await,
                None => Ok(()),
            }
        }
    })
    .await
}

/// Repeats a set-color fan-out once per tick until `timing.duration` has
/// elapsed or `cancel` fires. Returns the number of fan-outs issued.
pub async fn run_timed_sequence<N>(
    targets: Vec<DeviceHandle>,
    timing: Timing,
    cancel: &CancellationToken,
    mut next_color: N,
) -> usize
where
    N: FnMut() -> Color,
{
    let started = Instant::now();
    let mut ticker = tokio::time::interval(timing.tick);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut ticks = 0;
    while started.elapsed() < timing.duration {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!(ticks, "sequence cancelled");
                break;
            }
            _ = ticker.tick() => {}
        }

        if started.elapsed() >= timing.duration {
            break;
        }

        let color = next_color();
        debug!(%color, tick = ticks, "sequence tick");
        dispatch_all(targets.clone(), cancel, move |_, handle| async move {
            handle.set_color(color).await
        })
        .await;
        ticks += 1;
    }

    ticks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::Dispatcher;
    use crate::testing::{RecordingRunner, bulb, rgb_hex};
    use std::sync::Arc;

    fn bulbs(count: usize, runner: &Arc<RecordingRunner>) -> Vec<DeviceHandle> {
        let devices = (1..=count)
            .map(|i| bulb(&format!("Bulb {i}"), &format!("t{i}")))
            .collect();
        Dispatcher::new(devices, runner.clone()).bulbs()
    }

    #[test]
    fn test_palette_literals() {
        assert_eq!(DANCE_PALETTE.len(), 13);
        assert_eq!(DANCE_PALETTE[0].to_hex(), "ff80ed");
        assert_eq!(DANCE_PALETTE[12].to_hex(), "ffd700");
        assert_eq!(UKRAINE_YELLOW.to_hex(), "ffd500");
        assert_eq!(UKRAINE_BLUE.to_hex(), "005bbb");
    }

    #[test]
    fn test_random_from_stays_in_palette() {
        let mut next = random_from(DANCE_PALETTE.to_vec());
        for _ in 0..500 {
            assert!(DANCE_PALETTE.contains(&next()));
        }
    }

    #[test]
    fn test_random_from_empty_palette() {
        let color = random_from(Vec::new())();
        assert!(color.red < 255 && color.green < 255 && color.blue < 255);
    }

    #[test]
    fn test_two_tone_slots() {
        let assign = two_tone(UKRAINE_YELLOW, UKRAINE_BLUE);
        assert_eq!(assign(1), Some(UKRAINE_YELLOW));
        assert_eq!(assign(2), Some(UKRAINE_YELLOW));
        assert_eq!(assign(3), Some(UKRAINE_BLUE));
        assert_eq!(assign(4), None);
        assert_eq!(assign(0), None);
    }

    #[test]
    fn test_zero_tick_is_clamped() {
        let timing = Timing::new(Duration::from_secs(1), Duration::ZERO);
        assert_eq!(timing.tick, MIN_TICK);
    }

    #[tokio::test]
    async fn test_ukraine_colors_first_three_bulbs() {
        let runner = Arc::new(RecordingRunner::new());
        let targets = bulbs(4, &runner);

        let outcomes = paint_by_index(
            targets,
            &CancellationToken::new(),
            two_tone(UKRAINE_YELLOW, UKRAINE_BLUE),
        )
        .await;
        assert!(outcomes.iter().all(Outcome::is_ok));

        let mut painted: Vec<(String, String)> = runner
            .calls()
            .iter()
            .map(|args| (args[2].clone(), rgb_hex(args).unwrap()))
            .collect();
        painted.sort();

        assert_eq!(
            painted,
            vec![
                ("t1".to_string(), "FFD500".to_string()),
                ("t2".to_string(), "FFD500".to_string()),
                ("t3".to_string(), "005BBB".to_string()),
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_dance_stops_when_duration_elapses() {
        let runner = Arc::new(RecordingRunner::new());
        let targets = bulbs(3, &runner);
        let timing = Timing::new(Duration::from_secs(20), Duration::from_secs(1));
        let started = Instant::now();

        let ticks = run_timed_sequence(
            targets,
            timing,
            &CancellationToken::new(),
            random_from(DANCE_PALETTE.to_vec()),
        )
        .await;

        assert_eq!(ticks, 20);
        assert_eq!(runner.calls().len(), 20 * 3);
        assert!(runner
            .call_times()
            .iter()
            .all(|at| at.duration_since(started) < timing.duration));

        let palette: Vec<String> = DANCE_PALETTE.iter().map(|c| c.to_hex().to_uppercase()).collect();
        assert!(runner
            .calls()
            .iter()
            .all(|args| palette.contains(&rgb_hex(args).unwrap())));

        tokio::time::advance(Duration::from_secs(60)).await;
        assert_eq!(runner.calls().len(), 20 * 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_every_tick_paints_all_bulbs_the_same_color() {
        let runner = Arc::new(RecordingRunner::new());
        let targets = bulbs(2, &runner);
        let timing = Timing::new(Duration::from_secs(3), Duration::from_secs(1));

        let mut palette = DANCE_PALETTE.iter().copied().cycle();
        let ticks = run_timed_sequence(targets, timing, &CancellationToken::new(), move || {
            palette.next().unwrap_or(UKRAINE_BLUE)
        })
        .await;
        assert_eq!(ticks, 3);

        let mut colors: Vec<String> = runner.calls().iter().filter_map(|a| rgb_hex(a)).collect();
        colors.sort();
        assert_eq!(
            colors,
            vec!["00FF00", "00FF00", "00FFFF", "00FFFF", "FF80ED", "FF80ED"]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_stops_sequence() {
        let runner = Arc::new(RecordingRunner::new());
        let targets = bulbs(2, &runner);
        let cancel = CancellationToken::new();
        cancel.cancel();

        let ticks = run_timed_sequence(
            targets,
            Timing::new(Duration::from_secs(20), Duration::from_secs(1)),
            &cancel,
            random_from(DANCE_PALETTE.to_vec()),
        )
        .await;

        assert_eq!(ticks, 0);
        assert!(runner.calls().is_empty());
    }
}

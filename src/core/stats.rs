//! Session statistics: a fold over emitted frames, separate from the tracker
//!
//! Time between two frames is credited to the state of the earlier frame.

use std::time::Instant;

use crate::types::{Alert, AttentionState, EmittedFrame, ScoreGrade, SessionStats};

#[derive(Debug, Default, Clone)]
pub struct StatsCollector {
    stats: SessionStats,
    first_at: Option<Instant>,
    last: Option<(Instant, AttentionState)>,
    score_sum: f64,
}

impl StatsCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, frame: &EmittedFrame, now: Instant) {
        let s = &mut self.stats;

        if let Some((last_at, last_state)) = self.last {
            let secs = now.saturating_duration_since(last_at).as_secs_f64();
            s.time_in_state.add(last_state, secs);
            if last_state == AttentionState::Focused {
                s.focused_secs += secs;
            } else if last_state.is_distracted() {
                s.distracted_secs += secs;
            }
        }
        let first_at = *self.first_at.get_or_insert(now);
        s.duration_secs = now.saturating_duration_since(first_at).as_secs_f64();

        let entered_away = frame.state == AttentionState::Away
            && self.last.map_or(true, |(_, prev)| prev != AttentionState::Away);
        if entered_away {
            s.away_episodes += 1;
        }
        if frame.alerts.contains(&Alert::AwayFiveSeconds) {
            s.away_warnings += 1;
        }
        if frame.transition_alert.is_some() {
            s.transition_alerts += 1;
        }

        let raw = frame.raw_score;
        s.frame_count += 1;
        s.current_score = frame.smoothed_score;
        s.min_score = Some(s.min_score.map_or(raw, |m| m.min(raw)));
        s.max_score = Some(s.max_score.map_or(raw, |m| m.max(raw)));
        self.score_sum += raw;
        s.avg_score = Some(self.score_sum / s.frame_count as f64);

        match ScoreGrade::from_score(raw) {
            ScoreGrade::Excellent => s.distribution.excellent += 1,
            ScoreGrade::Good => s.distribution.good += 1,
            ScoreGrade::Distracted => s.distribution.distracted += 1,
            ScoreGrade::Poor => s.distribution.poor += 1,
        }

        self.last = Some((now, frame.state));
    }

    /// Copy of the aggregate so far
    pub fn snapshot(&self) -> SessionStats {
        self.stats.clone()
    }
}

/// Multi-line statistics report for terminal output
pub fn format_report(stats: &SessionStats) -> String {
    let mut out = String::new();
    let rule = "=".repeat(60);
    out.push_str(&format!("{}\nFOCUS MONITORING STATISTICS\n{}\n", rule, rule));
    out.push_str(&format!("Session Duration: {:.1} seconds\n", stats.duration_secs));
    out.push_str(&format!("Total Frames: {}\n", stats.frame_count));

    if let (Some(avg), Some(max), Some(min)) = (stats.avg_score, stats.max_score, stats.min_score) {
        out.push_str("\nFOCUS SCORE:\n");
        out.push_str(&format!("   Current: {:.0}%\n", stats.current_score));
        out.push_str(&format!("   Average: {:.0}%\n", avg));
        out.push_str(&format!("   Max:     {:.0}%\n", max));
        out.push_str(&format!("   Min:     {:.0}%\n", min));

        let d = &stats.distribution;
        let total = d.total().max(1) as f64;
        out.push_str("\nSCORE DISTRIBUTION:\n");
        for (name, count) in [
            ("Excellent (85-100%)", d.excellent),
            ("Good (70-84%)      ", d.good),
            ("Distracted (50-69%)", d.distracted),
            ("Poor (<50%)        ", d.poor),
        ] {
            out.push_str(&format!(
                "   {}: {} frames ({:.1}%)\n",
                name,
                count,
                count as f64 / total * 100.0
            ));
        }
    }

    out.push_str("\nTIME BREAKDOWN:\n");
    out.push_str(&format!(
        "   Focus Time:      {:.1}s ({:.1}%)\n",
        stats.focused_secs,
        stats.focus_percentage()
    ));
    out.push_str(&format!(
        "   Distracted Time: {:.1}s ({:.1}%)\n",
        stats.distracted_secs,
        stats.distracted_percentage()
    ));
    for state in AttentionState::ALL {
        out.push_str(&format!(
            "   {:<13} {:.1}s\n",
            format!("{}:", state.tag()),
            stats.time_in_state.get(state)
        ));
    }
    out.push_str(&format!(
        "\nAway episodes: {} | away warnings: {} | alerts: {}\n",
        stats.away_episodes, stats.away_warnings, stats.transition_alerts
    ));
    out.push_str(&rule);
    out.push('\n');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::time::Duration;

    fn frame(state: AttentionState, raw: f64, alerts: Vec<Alert>) -> EmittedFrame {
        EmittedFrame {
            timestamp: Utc::now(),
            smoothed_score: raw,
            raw_score: raw,
            status: String::new(),
            state,
            away_duration: 0.0,
            alerts,
            transition_alert: None,
            faces_detected: 0,
            eyes_detected: 0,
        }
    }

    #[test]
    fn test_empty_collector() {
        let stats = StatsCollector::new().snapshot();
        assert_eq!(stats.frame_count, 0);
        assert!(stats.avg_score.is_none());
        assert_eq!(stats.focus_percentage(), 0.0);
    }

    #[test]
    fn test_time_credited_to_previous_state() {
        let mut c = StatsCollector::new();
        let t0 = Instant::now();
        c.record(&frame(AttentionState::Focused, 100.0, vec![]), t0);
        c.record(&frame(AttentionState::Away, 0.0, vec![Alert::NoFace]), t0 + Duration::from_secs(4));
        c.record(&frame(AttentionState::Unknown, 70.0, vec![]), t0 + Duration::from_secs(6));
        c.record(&frame(AttentionState::Focused, 100.0, vec![]), t0 + Duration::from_secs(7));

        let s = c.snapshot();
        assert_eq!(s.frame_count, 4);
        assert_eq!(s.duration_secs, 7.0);
        assert_eq!(s.time_in_state.focused, 4.0);
        assert_eq!(s.time_in_state.away, 2.0);
        assert_eq!(s.time_in_state.unknown, 1.0);
        assert_eq!(s.focused_secs, 4.0);
        assert_eq!(s.distracted_secs, 2.0);
        assert_eq!(s.time_in_state.total(), s.duration_secs);
    }

    #[test]
    fn test_score_aggregates_and_distribution() {
        let mut c = StatsCollector::new();
        let t0 = Instant::now();
        for (i, raw) in [100.0, 75.0, 55.0, 10.0].into_iter().enumerate() {
            c.record(&frame(AttentionState::Focused, raw, vec![]), t0 + Duration::from_secs(i as u64));
        }
        let s = c.snapshot();
        assert_eq!(s.min_score, Some(10.0));
        assert_eq!(s.max_score, Some(100.0));
        assert_eq!(s.avg_score, Some(60.0));
        assert_eq!(s.distribution.excellent, 1);
        assert_eq!(s.distribution.good, 1);
        assert_eq!(s.distribution.distracted, 1);
        assert_eq!(s.distribution.poor, 1);
    }

    #[test]
    fn test_away_episodes_and_warnings() {
        let mut c = StatsCollector::new();
        let t0 = Instant::now();
        let secs = |s: u64| t0 + Duration::from_secs(s);
        c.record(&frame(AttentionState::Away, 0.0, vec![Alert::NoFace]), secs(0));
        c.record(&frame(AttentionState::Away, 0.0, vec![Alert::NoFace, Alert::AwayFiveSeconds]), secs(5));
        c.record(&frame(AttentionState::Focused, 100.0, vec![]), secs(6));
        c.record(&frame(AttentionState::Away, 10.0, vec![Alert::LookingLeft]), secs(7));

        let s = c.snapshot();
        assert_eq!(s.away_episodes, 2);
        assert_eq!(s.away_warnings, 1);
    }

    #[test]
    fn test_report_mentions_sections() {
        let mut c = StatsCollector::new();
        c.record(&frame(AttentionState::Focused, 100.0, vec![]), Instant::now());
        let report = format_report(&c.snapshot());
        assert!(report.contains("FOCUS MONITORING STATISTICS"));
        assert!(report.contains("Total Frames: 1"));
        assert!(report.contains("SCORE DISTRIBUTION"));
        assert!(report.contains("looking_down:"));
    }
}

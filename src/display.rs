//! Plain-text rendering of entries and reports.
//!
//! All functions return strings so the binary decides where output goes and
//! tests can check it without capturing stdout.

use crate::cli::OutputFormat;
use crate::constants::{
    DATE_FORMAT_ISO, DISPLAY_TIME_FORMAT, MINUTES_PER_HOUR, MOOD_SCORE_MAX, MOOD_SCORE_MIN,
    SPARKLINE_BLOCKS,
};
use crate::ops::{DoctorReport, MedicationStats, MoodStats, Summary, TrendDirection};
use crate::records::{MedicationEntry, MoodEntry, Timestamped, WaterEntry};
use chrono::{DateTime, FixedOffset, Local};

/// An entry that can be printed as a line or a block.
pub trait Render {
    fn line(&self) -> String;
    fn block(&self) -> String;

    fn render(&self, format: OutputFormat) -> String {
        match format {
            OutputFormat::Line => self.line(),
            OutputFormat::Block => self.block(),
        }
    }
}

impl Render for MoodEntry {
    fn line(&self) -> String {
        let mut out = format!("{}  mood {}/10", when(self.timestamp()), self.score);
        if let Some(total) = self.sleep_total {
            out.push_str(&format!("  sleep {}", format_minutes(total)));
        }
        if !self.tags.is_empty() {
            out.push_str(&format!("  [{}]", self.tags.join(", ")));
        }
        if let Some(notes) = &self.notes {
            out.push_str(&format!("  \"{}\"", notes));
        }
        out
    }

    fn block(&self) -> String {
        let mut lines = vec![
            format!("Mood {}/10", self.score),
            format!("  when:  {}", when(self.timestamp())),
        ];
        let sleep: Vec<String> = [
            ("total", self.sleep_total),
            ("rem", self.sleep_rem),
            ("deep", self.sleep_deep),
        ]
        .iter()
        .filter_map(|(label, value)| value.map(|m| format!("{} {}", label, format_minutes(m))))
        .collect();
        if !sleep.is_empty() {
            lines.push(format!("  sleep: {}", sleep.join(", ")));
        }
        if !self.tags.is_empty() {
            lines.push(format!("  tags:  {}", self.tags.join(", ")));
        }
        if let Some(notes) = &self.notes {
            lines.push(format!("  notes: {}", notes));
        }
        lines.push(format!("  id:    {}", self.id));
        lines.join("\n")
    }
}

impl Render for MedicationEntry {
    fn line(&self) -> String {
        let mut out = format!("{}  {} {}", when(self.timestamp()), self.name, self.dose);
        if let Some(notes) = &self.notes {
            out.push_str(&format!("  \"{}\"", notes));
        }
        out.trim_end().to_string()
    }

    fn block(&self) -> String {
        let mut lines = vec![
            format!("{} {}", self.name, self.dose).trim_end().to_string(),
            format!("  when:  {}", when(self.timestamp())),
        ];
        if let Some(notes) = &self.notes {
            lines.push(format!("  notes: {}", notes));
        }
        lines.push(format!("  id:    {}", self.id));
        lines.join("\n")
    }
}

impl Render for WaterEntry {
    fn line(&self) -> String {
        format!("{}  water {} oz", when(self.timestamp()), self.ounces)
    }

    fn block(&self) -> String {
        [
            format!("Water {} oz", self.ounces),
            format!("  when:  {}", when(self.timestamp())),
            format!("  id:    {}", self.id),
        ]
        .join("\n")
    }
}

/// Renders several entries, separating blocks with a blank line.
pub fn render_entries<E: Render>(entries: &[&E], format: OutputFormat) -> String {
    let separator = match format {
        OutputFormat::Line => "\n",
        OutputFormat::Block => "\n\n",
    };
    entries
        .iter()
        .map(|e| e.render(format))
        .collect::<Vec<_>>()
        .join(separator)
}

/// Formats minutes as `7h30m`, `7h` or `45m`.
pub fn format_minutes(minutes: u32) -> String {
    let (hours, mins) = (minutes / MINUTES_PER_HOUR, minutes % MINUTES_PER_HOUR);
    match (hours, mins) {
        (0, m) => format!("{}m", m),
        (h, 0) => format!("{}h", h),
        (h, m) => format!("{}h{:02}m", h, m),
    }
}

fn when(ts: DateTime<FixedOffset>) -> String {
    let local = ts.with_timezone(&Local);
    format!(
        "{} {}",
        local.format(DATE_FORMAT_ISO),
        local.format(DISPLAY_TIME_FORMAT)
    )
}

/// One block character per value, scaled over the mood score range.
pub fn sparkline(values: &[f64]) -> String {
    let blocks: Vec<char> = SPARKLINE_BLOCKS.chars().collect();
    let top = blocks.len() - 1;
    let (low, high) = (MOOD_SCORE_MIN as f64, MOOD_SCORE_MAX as f64);

    values
        .iter()
        .map(|v| {
            let scaled = ((v - low) / (high - low) * top as f64).round();
            blocks[scaled.clamp(0.0, top as f64) as usize]
        })
        .collect()
}

pub fn render_mood_stats(stats: &MoodStats) -> String {
    let mut lines = vec![format!("Mood stats ({})", stats.window)];
    lines.push(format!("  entries: {}", stats.count));
    lines.push(match stats.mean {
        Some(mean) => format!("  mean:    {:.2}", mean),
        None => "  mean:    n/a".to_string(),
    });
    lines.push(format!("  streak:  {} day(s)", stats.longest_streak));
    if !stats.daily.is_empty() {
        let means: Vec<f64> = stats.daily.iter().map(|d| d.mean).collect();
        lines.push(format!("  daily:   {}", sparkline(&means)));
    }

    if let (Some(best), Some(worst)) = (stats.best_day(), stats.worst_day()) {
        lines.push(format!(
            "  best:    {} ({:.2})",
            best.date.format(DATE_FORMAT_ISO),
            best.mean
        ));
        lines.push(format!(
            "  worst:   {} ({:.2})",
            worst.date.format(DATE_FORMAT_ISO),
            worst.mean
        ));
    }

    if let Some(trend) = &stats.trend {
        let direction = match trend.direction {
            TrendDirection::Improving => "improving",
            TrendDirection::Declining => "declining",
            TrendDirection::Stable => "stable",
        };
        lines.push(format!(
            "  trend:   {} ({:+.2}/day, net {:+.2})",
            direction, trend.slope_per_day, trend.net_change
        ));
    }

    if stats.count > 0 {
        let distribution: Vec<String> = stats
            .distribution
            .iter()
            .enumerate()
            .filter(|(_, count)| **count > 0)
            .map(|(i, count)| format!("{}:{}", i + 1, count))
            .collect();
        lines.push(format!("  scores:  {}", distribution.join(" ")));
    }

    if !stats.top_tags.is_empty() {
        let tags: Vec<String> = stats
            .top_tags
            .iter()
            .map(|t| format!("{} ({})", t.tag, t.count))
            .collect();
        lines.push(format!("  tags:    {}", tags.join(", ")));
    }

    lines.join("\n")
}

pub fn render_medication_stats(stats: &MedicationStats) -> String {
    let mut lines = vec![format!("Medication stats (last {} days)", stats.days)];
    if stats.medications.is_empty() {
        lines.push("  no doses logged".to_string());
    }
    for med in &stats.medications {
        let gap = med
            .average_gap_hours
            .map(|h| format!("avg gap {:.1}h", h))
            .unwrap_or_else(|| "avg gap n/a".to_string());
        lines.push(format!(
            "  {}: {} dose(s), {}, last {}",
            med.name,
            med.count,
            gap,
            when(med.last_taken)
        ));
    }
    if !stats.common_hours.is_empty() {
        let hours: Vec<String> = stats
            .common_hours
            .iter()
            .map(|h| format!("{:02}:00 ({})", h.hour, h.count))
            .collect();
        lines.push(format!("  common hours: {}", hours.join(", ")));
    }
    lines.join("\n")
}

pub fn render_summary(summary: &Summary) -> String {
    let mut lines = vec![format!("Summary for {}", summary.date.format(DATE_FORMAT_ISO))];

    lines.push(match &summary.latest_mood {
        Some(mood) => format!("  latest mood: {}", mood.line()),
        None => "  latest mood: none yet".to_string(),
    });
    lines.push(match &summary.latest_medication {
        Some(med) => format!("  latest med:  {}", med.line()),
        None => "  latest med:  none yet".to_string(),
    });

    let today = &summary.today;
    lines.push(format!(
        "  today: {} mood, {} med, {} water ({} oz)",
        today.moods, today.medications, today.water_entries, today.water_ounces
    ));
    for med in &summary.todays_medications {
        lines.push(format!("    {}", med.line()));
    }

    if !summary.recent_daily_moods.is_empty() {
        lines.push("  recent moods:".to_string());
        for day in &summary.recent_daily_moods {
            lines.push(format!(
                "    {} {}  {:.1} ({} entr{})",
                day.date.format(DATE_FORMAT_ISO),
                day.date.format("%a"),
                day.mean,
                day.count,
                if day.count == 1 { "y" } else { "ies" }
            ));
        }
    }

    lines.join("\n")
}

pub fn render_doctor(report: &DoctorReport) -> String {
    let mut lines = vec![format!("Data file: {}", report.data_path.display())];

    match &report.repo_root {
        Some(root) => lines.push(format!(
            "⚠️  inside git repository {} (allowed by --allow-repo-data-path)",
            root.display()
        )),
        None => lines.push("✅ not inside a git repository".to_string()),
    }

    match report.counts {
        Some(counts) => lines.push(format!(
            "✅ loads cleanly: {} mood, {} medication, {} water entries",
            counts.moods, counts.medications, counts.water
        )),
        None => lines.push("⚠️  file does not exist yet; run `chaoscatcher init`".to_string()),
    }

    if let Some(mode) = report.file_mode {
        if report.permissions_too_open() {
            lines.push(format!(
                "⚠️  permissions {:o} allow other users to read it; expected 600",
                mode
            ));
        } else {
            lines.push(format!("✅ permissions {:o}", mode));
        }
    }

    lines.join("\n")
}

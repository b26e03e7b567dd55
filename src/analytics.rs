//! Pure training analytics over activity records.
//!
//! Nothing here performs I/O or fails: absent heart rate yields [`Effort::Unknown`], and absent
//! or zero distance/time yields a pace of `0.0`.

// self
use crate::{_prelude::*, resources::Activity};

const EASY_HR_CEILING: f64 = 120.;
const MODERATE_HR_CEILING: f64 = 150.;
const EASY_SHARE_FLOOR: f64 = 70.;
const MODERATE_SHARE_CEILING: f64 = 40.;
const RUN_VOLUME_FLOOR_KM: f64 = 20.;
const WEEKLY_HOURS_FLOOR: f64 = 5.;
const RECOVERY_ADVICE_THRESHOLD: u32 = 5;

/// Effort classification derived from average heart rate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Effort {
	/// Below 120 bpm.
	Easy,
	/// 120 to 149 bpm.
	Moderate,
	/// 150 bpm and above.
	Hard,
	/// No heart-rate data.
	Unknown,
}
impl Effort {
	/// Classifies an average heart rate.
	pub fn from_heart_rate(heart_rate: Option<f64>) -> Self {
		match heart_rate {
			Some(hr) if !hr.is_finite() => Effort::Unknown,
			Some(hr) if hr < EASY_HR_CEILING => Effort::Easy,
			Some(hr) if hr < MODERATE_HR_CEILING => Effort::Moderate,
			Some(_) => Effort::Hard,
			None => Effort::Unknown,
		}
	}

	/// Returns a stable display label.
	pub const fn as_str(self) -> &'static str {
		match self {
			Effort::Easy => "Easy",
			Effort::Moderate => "Moderate",
			Effort::Hard => "Hard",
			Effort::Unknown => "Unknown",
		}
	}
}
impl Display for Effort {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Pace for runs (minutes per km) or speed for rides (km per hour); `0.0` for anything else.
pub fn pace(activity: &Activity) -> f64 {
	let distance_km = activity.distance.unwrap_or_default() / 1_000.;
	let moving_secs = activity.moving_time.unwrap_or_default();
	let value = match activity.kind() {
		"Run" if distance_km > 0. => (moving_secs / 60.) / distance_km,
		"Ride" if moving_secs > 0. => distance_km / (moving_secs / 3_600.),
		_ => 0.,
	};

	if value.is_finite() { value } else { 0. }
}

/// Effort of a single activity.
pub fn effort(activity: &Activity) -> Effort {
	Effort::from_heart_rate(activity.average_heartrate)
}

/// Per-activity analysis.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ActivityAnalysis {
	/// Activity type.
	#[serde(rename = "type")]
	pub activity_type: Option<String>,
	/// Distance in meters.
	pub distance: Option<f64>,
	/// Moving time in seconds.
	pub moving_time: Option<f64>,
	/// Derived metrics.
	pub analysis: ActivityMetrics,
}

/// Metrics derived by [`analyze_activity`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ActivityMetrics {
	/// See [`pace`].
	pub pace: f64,
	/// See [`effort`].
	pub effort: Effort,
}

/// Pace and effort of one activity.
pub fn analyze_activity(activity: &Activity) -> ActivityAnalysis {
	ActivityAnalysis {
		activity_type: activity.activity_type.clone(),
		distance: activity.distance,
		moving_time: activity.moving_time,
		analysis: ActivityMetrics { pace: pace(activity), effort: effort(activity) },
	}
}

/// Activity counts per heart-rate band.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeartRateZones {
	/// Average below 120 bpm.
	pub easy: u32,
	/// Average from 120 to 149 bpm.
	pub medium: u32,
	/// Average of 150 bpm and above.
	pub hard: u32,
}
impl HeartRateZones {
	/// Activities that carried heart-rate data.
	pub fn total(&self) -> u32 {
		self.easy + self.medium + self.hard
	}
}

/// Aggregate load over a set of activities.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TrainingLoad {
	/// Number of activities considered.
	pub activities_count: usize,
	/// Total distance in km, rounded to two decimals.
	pub total_distance: f64,
	/// Total moving time in hours, rounded to two decimals.
	pub total_time: f64,
	/// Activity counts keyed by type.
	pub activities_by_type: BTreeMap<String, usize>,
	/// Activity counts per heart-rate band; activities without heart rate are not counted.
	pub heart_rate_zones: HeartRateZones,
}

/// Sums distance, time, type counts, and heart-rate bands.
pub fn analyze_training_load(activities: &[Activity]) -> TrainingLoad {
	let mut load = TrainingLoad { activities_count: activities.len(), ..Default::default() };
	let mut meters = 0.;
	let mut seconds = 0.;

	for activity in activities {
		let kind = activity.activity_type.clone().unwrap_or_else(|| "Unknown".into());

		*load.activities_by_type.entry(kind).or_default() += 1;
		meters += activity.distance.unwrap_or_default();
		seconds += activity.moving_time.unwrap_or_default();

		// A zero reading means the sensor reported nothing.
		let band = activity
			.average_heartrate
			.filter(|hr| *hr != 0.)
			.map(|hr| Effort::from_heart_rate(Some(hr)));

		match band {
			Some(Effort::Easy) => load.heart_rate_zones.easy += 1,
			Some(Effort::Moderate) => load.heart_rate_zones.medium += 1,
			Some(Effort::Hard) => load.heart_rate_zones.hard += 1,
			Some(Effort::Unknown) | None => (),
		}
	}

	load.total_distance = round2(meters / 1_000.);
	load.total_time = round2(seconds / 3_600.);

	load
}

/// Advice derived from [`analyze_training_load`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Recommendations {
	/// Underlying aggregate.
	pub analysis: TrainingLoad,
	/// Advice paragraphs, most specific first.
	pub recommendations: Vec<String>,
	/// Pre-formatted figures for display.
	pub summary: RecommendationSummary,
}

/// Display-ready figures accompanying [`Recommendations`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RecommendationSummary {
	/// Volume over the analyzed period.
	pub weekly_stats: WeeklyStats,
	/// Share of heart-rate-tagged activities per band.
	pub intensity_distribution: IntensityDistribution,
	/// Share of activities per type.
	pub activity_distribution: BTreeMap<String, String>,
}

/// Volume over the analyzed period.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyStats {
	/// Distance such as `"7.0 km"`.
	pub distance: String,
	/// Moving time such as `"1.5 h"`.
	pub time: String,
	/// Number of activities.
	pub activities: usize,
}

/// Percent labels such as `"50%"`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntensityDistribution {
	/// Easy share.
	pub easy: String,
	/// Moderate share.
	pub medium: String,
	/// Hard share.
	pub hard: String,
}

/// Produces training advice for a recent block of activities.
pub fn training_recommendations(activities: &[Activity]) -> Recommendations {
	let analysis = analyze_training_load(activities);
	let zones = analysis.heart_rate_zones;
	let zone_total = zones.total();
	let share = |count: u32| {
		if zone_total == 0 { 0. } else { f64::from(count) / f64::from(zone_total) * 100. }
	};
	let (easy, medium, hard) = (share(zones.easy), share(zones.medium), share(zones.hard));
	let mut recommendations = Vec::new();

	if zone_total > 0 {
		if easy < EASY_SHARE_FLOOR {
			recommendations.push(format!(
				"Too few easy sessions ({easy:.0}%). Consider:\n\
				 - adding recovery sessions\n\
				 - doing more base work in low heart-rate zones\n\
				 - monitoring heart rate during training"
			));
		}
		if medium > MODERATE_SHARE_CEILING {
			recommendations.push(format!(
				"A large share of sessions sits in the moderate zone ({medium:.0}%). Consider:\n\
				 - clearly separating easy and hard sessions\n\
				 - avoiding grey-zone training"
			));
		}
	}
	if analysis.activities_by_type.contains_key("Run") {
		let run_km = activities
			.iter()
			.filter(|activity| activity.kind() == "Run")
			.map(|activity| activity.distance.unwrap_or_default())
			.sum::<f64>()
			/ 1_000.;

		if run_km < RUN_VOLUME_FLOOR_KM {
			recommendations.push(format!(
				"Running volume ({run_km:.1} km) is below optimal.\n\
				 To build it up:\n\
				 - add 1-2 km to the long run each week\n\
				 - include easy recovery runs\n\
				 - work up to 30-40 km per week gradually"
			));
		}
	}
	if analysis.total_time < WEEKLY_HOURS_FLOOR {
		recommendations.push(format!(
			"Total volume ({:.1} h) can be increased.\n\
			 Suggestions:\n\
			 - add about 30 minutes per week\n\
			 - include cross-training for variety\n\
			 - watch how you feel as the load grows",
			analysis.total_time
		));
	}
	if zone_total > RECOVERY_ADVICE_THRESHOLD {
		recommendations.push(
			"Recovery:\n\
			 - aim for 7-8 hours of sleep\n\
			 - schedule easy days after hard sessions\n\
			 - keep nutrition and hydration in check"
				.to_owned(),
		);
	}
	if recommendations.is_empty() {
		recommendations.push(
			"Training is well balanced!\n\
			 To maintain form:\n\
			 - keep following the current plan\n\
			 - keep a training log\n\
			 - review progress regularly"
				.to_owned(),
		);
	}

	let total = analysis.activities_count;
	let activity_distribution = analysis
		.activities_by_type
		.iter()
		.map(|(kind, count)| (kind.clone(), percent(*count as f64 / total as f64 * 100.)))
		.collect();
	let summary = RecommendationSummary {
		weekly_stats: WeeklyStats {
			distance: format!("{:.1} km", analysis.total_distance),
			time: format!("{:.1} h", analysis.total_time),
			activities: total,
		},
		intensity_distribution: IntensityDistribution {
			easy: percent(easy),
			medium: percent(medium),
			hard: percent(hard),
		},
		activity_distribution,
	};

	Recommendations { analysis, recommendations, summary }
}

fn percent(value: f64) -> String {
	format!("{value:.0}%")
}

fn round2(value: f64) -> f64 {
	(value * 100.).round() / 100.
}

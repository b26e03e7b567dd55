// self
use crate::{
	_prelude::*,
	auth::ActivityId,
	client::ApiRequest,
	obs::OpKind,
	resources::{
		Activity, ActivityQuery, DEFAULT_RECENT_LIMIT, MAX_PER_PAGE, StravaResources, call,
	},
};

impl StravaResources {
	/// Most recent activities, newest first; `limit` defaults to 10 and is capped at 200.
	pub async fn recent_activities(&self, limit: Option<u32>) -> Result<Vec<Activity>> {
		let limit = limit.unwrap_or(DEFAULT_RECENT_LIMIT).clamp(1, MAX_PER_PAGE);

		call(OpKind::RecentActivities, async {
			let activities = self
				.fetch::<Vec<Activity>>(
					ApiRequest::get("athlete/activities").query("per_page", limit),
				)
				.await?;

			tracing::info!(count = activities.len(), limit, "recent activities fetched");

			Ok(activities)
		})
		.await
	}

	/// One page of the activity listing.
	pub async fn activities(&self, query: ActivityQuery) -> Result<Vec<Activity>> {
		call(OpKind::Activities, async {
			self.fetch(ApiRequest::get("athlete/activities").params(query.to_params())).await
		})
		.await
	}

	/// Detailed activity.
	pub async fn activity(&self, id: &ActivityId) -> Result<Activity> {
		call(OpKind::Activity, async {
			self.fetch(ApiRequest::get(format!("activities/{id}"))).await
		})
		.await
	}
}

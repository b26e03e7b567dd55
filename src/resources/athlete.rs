// self
use crate::{
	_prelude::*,
	client::ApiRequest,
	obs::OpKind,
	resources::{AthleteZones, Club, StravaResources, call},
};

impl StravaResources {
	/// Heart-rate and power zones, with heart-rate zones named.
	pub async fn athlete_zones(&self) -> Result<AthleteZones> {
		call(OpKind::AthleteZones, async {
			let zones = self.fetch::<AthleteZones>(ApiRequest::get("athlete/zones")).await?;

			Ok(zones.with_zone_names())
		})
		.await
	}

	/// Clubs the athlete belongs to.
	pub async fn athlete_clubs(&self) -> Result<Vec<Club>> {
		call(OpKind::AthleteClubs, async { self.fetch(ApiRequest::get("athlete/clubs")).await })
			.await
	}
}

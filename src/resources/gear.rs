// self
use crate::{
	_prelude::*,
	auth::GearId,
	client::ApiRequest,
	obs::OpKind,
	resources::{Gear, StravaResources, call},
};

impl StravaResources {
	/// Bike or shoes by identifier.
	pub async fn gear(&self, id: &GearId) -> Result<Gear> {
		call(OpKind::Gear, async { self.fetch(ApiRequest::get(format!("gear/{id}"))).await }).await
	}
}

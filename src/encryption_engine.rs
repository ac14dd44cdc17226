use base64::{
	alphabet,
	engine::{self, general_purpose},
	Engine,
};

pub const CUSTOM_ENGINE: engine::GeneralPurpose = engine::GeneralPurpose::new(&alphabet::URL_SAFE, general_purpose::NO_PAD);

/// Synthetic car id derived from the `(make, model, year)` identity tuple.
pub fn car_id(make: &str, model: &str, year: i32) -> String {
	let input = format!("{}|{}|{}", make.trim().to_lowercase(), model.trim().to_lowercase(), year);
	CUSTOM_ENGINE.encode(input)
}

/// Reverses [`car_id`]; `None` when the id was not produced by it.
pub fn decode_car_id(id: &str) -> Option<(String, String, i32)> {
	let bytes = CUSTOM_ENGINE.decode(id).ok()?;
	let text = String::from_utf8(bytes).ok()?;
	let mut parts = text.splitn(3, '|');
	let make = parts.next()?.to_owned();
	let model = parts.next()?.to_owned();
	let year = parts.next()?.parse().ok()?;
	Some((make, model, year))
}

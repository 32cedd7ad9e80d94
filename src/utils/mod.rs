pub mod email;
pub mod expiry;
pub mod generate_coupon_code;

#[cfg(test)]
pub mod test_app_state;
#[cfg(test)]
pub mod test_fixtures;

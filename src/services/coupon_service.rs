use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde_json::Value;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
    config::Config,
    db_persistence::DbPersistence,
    errors::ValidationErrors,
    metrics::record_coupon_event,
    models::{
        coupon::{Coupon, CouponInput, CouponStatus, ExpiryDate, GiftCouponRequest},
        referral::{Referral, ReferralCouponRequest, ReferralCoupons, ReferralRole},
        usage::{CouponUsage, UsageEntry},
    },
    store::StoreError,
    utils::{email::normalize_email, generate_coupon_code::generate_coupon_code},
};

#[derive(Debug, thiserror::Error)]
pub enum CouponError {
    #[error("Invalid coupon data: {0}")]
    Validation(ValidationErrors),
    #[error("Coupon code {0} already exists")]
    DuplicateCode(String),
    #[error("Coupon {0} not found")]
    NotFound(String),
    #[error("Coupon {0} has already been used")]
    AlreadyUsed(String),
    #[error("Coupon {0} has expired")]
    Expired(String),
    #[error("Coupon {0} is not active")]
    Inactive(String),
    #[error("Failed to create {entity}: {source}")]
    Creation {
        entity: &'static str,
        #[source]
        source: StoreError,
    },
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

pub type CouponResult<T> = Result<T, CouponError>;

fn invalid_email(field: &str, raw: &str) -> CouponResult<String> {
    normalize_email(raw).map_err(|e| CouponError::Validation(ValidationErrors::single(field, e)))
}

fn parse_id(id: &str) -> CouponResult<Uuid> {
    Uuid::parse_str(id.trim()).map_err(|_| CouponError::NotFound(id.to_string()))
}

/// Reports reward coupon problems under the request field that caused them.
fn reward_field_errors(errors: &ValidationErrors) -> ValidationErrors {
    let mut renamed = ValidationErrors::new();
    for error in errors.errors() {
        let field = match error.field.as_str() {
            "discount_value" => "referrer_reward_value",
            other => other,
        };
        renamed.add(field, error.message.clone());
    }
    renamed
}

fn amount(value: Decimal) -> Value {
    Value::String(value.to_string())
}

/// Coupon lifecycle: creation, claiming, redemption, status changes and removal.
#[derive(Clone)]
pub struct CouponService {
    db: Arc<DbPersistence>,
    config: Arc<Config>,
}

impl CouponService {
    pub fn new(db: Arc<DbPersistence>, config: Arc<Config>) -> Self {
        Self { db, config }
    }

    pub fn generate_code(&self) -> String {
        generate_coupon_code(self.config.coupons.code_length)
    }

    pub fn qr_payload(&self, code: &str) -> String {
        format!("{}/{}", self.config.coupons.claim_base_url.trim_end_matches('/'), code)
    }

    pub fn short_url(&self, code: &str) -> String {
        let short_code: String = code.chars().take(self.config.coupons.short_code_length).collect();
        format!("{}/{}", self.config.coupons.short_url_base.trim_end_matches('/'), short_code)
    }

    pub async fn create_coupon(&self, input: CouponInput) -> CouponResult<Coupon> {
        let coupon =
            Coupon::new(input, Utc::now(), self.config.get_default_expiry()).map_err(CouponError::Validation)?;

        if self.db.coupons.find_by_code(&coupon.code).await?.is_some() {
            return Err(CouponError::DuplicateCode(coupon.code));
        }

        let created = match self.db.coupons.create(&coupon).await {
            Ok(created) => created,
            Err(StoreError::Conflict { .. }) => return Err(CouponError::DuplicateCode(coupon.code)),
            Err(source) => {
                return Err(CouponError::Creation {
                    entity: "coupon",
                    source,
                })
            }
        };

        info!(
            "Created coupon {} ({}, assigned: {})",
            created.code,
            created.discount_display(),
            created.is_assigned
        );
        record_coupon_event("created");

        Ok(created)
    }

    /// Creates a coupon under a freshly generated code, drawing a new code on collision.
    async fn create_generated(&self, build: impl Fn(String) -> CouponInput) -> CouponResult<Coupon> {
        let attempts = self.config.coupons.max_code_attempts.max(1);

        for attempt in 1..=attempts {
            let code = self.generate_code();
            let mut input = build(code.clone());
            input.qr_code_data = Some(self.qr_payload(&code));
            input.short_url = Some(self.short_url(&code));

            match self.create_coupon(input).await {
                Err(CouponError::DuplicateCode(code)) => {
                    warn!("Generated code {} collided (attempt {}/{})", code, attempt, attempts);
                }
                Err(CouponError::Store(source)) => {
                    return Err(CouponError::Creation {
                        entity: "coupon",
                        source,
                    })
                }
                other => return other,
            }
        }

        Err(CouponError::Creation {
            entity: "coupon",
            source: StoreError::Conflict {
                table: "coupons".to_string(),
                message: format!("no unique code after {} attempts", attempts),
            },
        })
    }

    pub async fn create_gift_coupon(&self, request: GiftCouponRequest) -> CouponResult<Coupon> {
        let recipient = invalid_email("recipient_email", &request.recipient_email)?;
        let sender = invalid_email("sender_email", &request.sender_email)?;

        let coupon = self
            .create_generated(|code| CouponInput {
                code: Some(code),
                name: Some(request.name.clone()),
                description: request.description.clone(),
                discount_type: Some(request.discount_type.to_string()),
                discount_value: Some(amount(request.discount_value)),
                minimum_spend: request.minimum_spend.map(amount),
                expiry_date: Some(request.expiry_date.clone()),
                assigned_to_email: Some(recipient.clone()),
                ..Default::default()
            })
            .await?;

        info!("Gift coupon {} created for {} by {}", coupon.code, recipient, sender);
        record_coupon_event("gift_created");

        Ok(coupon)
    }

    /// Issues the referee coupon, the optional referrer reward and the referral record.
    ///
    /// The reward coupon is best-effort. If the referral record cannot be written
    /// every coupon created here is removed again before the error is returned.
    pub async fn create_referral_coupon(&self, request: ReferralCouponRequest) -> CouponResult<ReferralCoupons> {
        let mut errors = ValidationErrors::new();
        let referrer = normalize_email(&request.referrer_email).unwrap_or_else(|e| {
            errors.add("referrer_email", e);
            String::new()
        });
        let referee = normalize_email(&request.referee_email).unwrap_or_else(|e| {
            errors.add("referee_email", e);
            String::new()
        });
        if !errors.is_empty() {
            return Err(CouponError::Validation(errors));
        }

        let now = Utc::now();
        let expiry = ExpiryDate::from_instant(now + self.config.get_referral_expiry());
        let kind = request.discount_type;
        let reward = request.referrer_reward_value.filter(|_| request.referrer_gets_reward);
        let reward_input = |code: String, value: Decimal| CouponInput {
            code: Some(code),
            name: Some(format!("Referrer Reward - {}{} Off", value.normalize(), kind.unit_symbol())),
            description: Some(format!("Thank you for referring {}", referee)),
            discount_type: Some(kind.to_string()),
            discount_value: Some(amount(value)),
            expiry_date: Some(expiry.0.clone()),
            assigned_to_email: Some(referrer.clone()),
            ..Default::default()
        };

        // Bad reward input is rejected up front; only store failures are best-effort.
        if let Some(value) = reward {
            Coupon::new(reward_input(self.generate_code(), value), now, self.config.get_default_expiry())
                .map_err(|errors| CouponError::Validation(reward_field_errors(&errors)))?;
        }

        let referee_coupon = self
            .create_generated(|code| CouponInput {
                code: Some(code),
                name: Some(format!(
                    "Referral Discount - {}{} Off",
                    request.discount_value.normalize(),
                    kind.unit_symbol()
                )),
                description: Some(format!("Special referral discount from {}", referrer)),
                discount_type: Some(kind.to_string()),
                discount_value: Some(amount(request.discount_value)),
                expiry_date: Some(expiry.0.clone()),
                assigned_to_email: Some(referee.clone()),
                ..Default::default()
            })
            .await?;

        let referrer_coupon = match reward {
            Some(value) => match self.create_generated(|code| reward_input(code, value)).await {
                Ok(coupon) => Some(coupon),
                Err(e) => {
                    warn!("Referrer reward for {} was not created: {}", referrer, e);
                    None
                }
            },
            None => None,
        };

        let referral = Referral {
            id: Uuid::new_v4(),
            referrer_email: referrer.clone(),
            referee_email: referee.clone(),
            coupon_id: Some(referee_coupon.id),
            discount_applied: request.discount_value,
            discount_type: kind,
            referrer_gets_reward: request.referrer_gets_reward,
            referrer_reward_coupon_id: referrer_coupon.as_ref().map(|c| c.id),
            referrer_reward_value: referrer_coupon.as_ref().and(request.referrer_reward_value),
            redeemed_at: Some(now),
            notes: request.notes.clone(),
            created_at: now,
            updated_at: now,
        };

        let referral = match self.db.referrals.create(&referral).await {
            Ok(stored) => stored,
            Err(source) => {
                warn!("Referral record for {} failed, removing its coupons: {}", referee, source);
                let created = std::iter::once(&referee_coupon).chain(referrer_coupon.as_ref());
                for coupon in created {
                    if let Err(e) = self.db.coupons.delete(&coupon.id).await {
                        warn!("Could not remove orphaned coupon {}: {}", coupon.code, e);
                    }
                }
                return Err(CouponError::Creation {
                    entity: "referral",
                    source,
                });
            }
        };

        info!(
            "Referral coupon {} created for {} (referred by {})",
            referee_coupon.code, referee, referrer
        );
        record_coupon_event("referral_created");

        Ok(ReferralCoupons {
            referee_coupon,
            referrer_coupon,
            referral,
        })
    }

    /// Optionally assigns `code` to `email`, then returns every coupon assigned to `email`.
    pub async fn claim(&self, code: Option<&str>, email: &str) -> CouponResult<Vec<Coupon>> {
        let email = invalid_email("email", email)?;

        if let Some(code) = code.map(str::trim).filter(|c| !c.is_empty()) {
            let coupon = self
                .db
                .coupons
                .find_by_code(code)
                .await?
                .ok_or_else(|| CouponError::NotFound(code.to_uppercase()))?;

            Self::ensure_usable(&coupon, Utc::now())?;

            if !coupon.is_assigned {
                self.db.coupons.assign(&coupon.id, &email, Utc::now()).await?;
                info!("Coupon {} claimed by {}", coupon.code, email);
                record_coupon_event("claimed");
            } else if coupon.assigned_to_email.as_deref() != Some(email.as_str()) {
                debug!("Coupon {} is already assigned to another email", coupon.code);
            }
        }

        Ok(self.db.coupons.find_all_by_email(&email).await?)
    }

    fn ensure_usable(coupon: &Coupon, now: DateTime<Utc>) -> CouponResult<()> {
        if coupon.is_used {
            return Err(CouponError::AlreadyUsed(coupon.code.clone()));
        }
        if !coupon.is_active {
            return Err(CouponError::Inactive(coupon.code.clone()));
        }
        if coupon.is_expired(now) {
            return Err(CouponError::Expired(coupon.code.clone()));
        }
        Ok(())
    }

    /// Marks a coupon consumed. Expiry is not checked here.
    pub async fn redeem(&self, id_or_code: &str, user_email: Option<&str>) -> CouponResult<Coupon> {
        let coupon = self
            .db
            .coupons
            .find_by_id_or_code(id_or_code)
            .await?
            .ok_or_else(|| CouponError::NotFound(id_or_code.to_string()))?;

        if coupon.is_used {
            return Err(CouponError::AlreadyUsed(coupon.code));
        }
        if !coupon.is_active {
            return Err(CouponError::Inactive(coupon.code));
        }

        let now = Utc::now();
        let redeemed = self
            .db
            .coupons
            .mark_used(&coupon.id, now)
            .await?
            .ok_or_else(|| CouponError::NotFound(coupon.code.clone()))?;

        info!("Coupon {} redeemed", redeemed.code);
        record_coupon_event("redeemed");

        let entry = UsageEntry {
            user_email: user_email.and_then(|e| normalize_email(e).ok()),
            discount_amount: redeemed.discount_value,
            used_at: now,
        };
        if let Err(e) = self.track_usage(&redeemed.code, entry).await {
            warn!("Usage tracking for {} failed: {}", redeemed.code, e);
        }

        Ok(redeemed)
    }

    async fn track_usage(&self, code: &str, entry: UsageEntry) -> Result<(), StoreError> {
        match self.db.usage.find_by_code(code).await? {
            Some(mut usage) => {
                usage.record(entry);
                self.db.usage.save(&usage, true).await
            }
            None => self.db.usage.save(&CouponUsage::first(code, entry), false).await,
        }
    }

    pub async fn delete(&self, id: &str) -> CouponResult<()> {
        let id = parse_id(id)?;
        if self.db.coupons.delete(&id).await? == 0 {
            return Err(CouponError::NotFound(id.to_string()));
        }

        info!("Coupon {} deleted", id);
        record_coupon_event("deleted");
        Ok(())
    }

    /// Deletes each id in turn and returns how many were actually removed.
    pub async fn bulk_delete(&self, ids: &[String]) -> usize {
        let mut deleted = 0;
        for id in ids {
            match self.delete(id).await {
                Ok(()) => deleted += 1,
                Err(e) => warn!("Skipping coupon {} in bulk delete: {}", id, e),
            }
        }
        deleted
    }

    pub async fn set_status(&self, id: &str, status: CouponStatus) -> CouponResult<Coupon> {
        let id = parse_id(id)?;
        let is_active = status == CouponStatus::Active;

        let coupon = self
            .db
            .coupons
            .set_active(&id, is_active, Utc::now())
            .await?
            .ok_or_else(|| CouponError::NotFound(id.to_string()))?;

        info!("Coupon {} set to {:?}", coupon.code, status);
        record_coupon_event(if is_active { "activated" } else { "deactivated" });
        Ok(coupon)
    }

    pub async fn bulk_set_status(&self, ids: &[String], status: CouponStatus) -> usize {
        let mut updated = 0;
        for id in ids {
            match self.set_status(id, status).await {
                Ok(_) => updated += 1,
                Err(e) => warn!("Skipping coupon {} in bulk status change: {}", id, e),
            }
        }
        updated
    }

    pub async fn get_coupon(&self, id_or_code: &str) -> CouponResult<Coupon> {
        self.db
            .coupons
            .find_by_id_or_code(id_or_code)
            .await?
            .ok_or_else(|| CouponError::NotFound(id_or_code.to_string()))
    }

    pub async fn list_coupons(&self) -> Vec<Coupon> {
        self.db.coupons.find_all().await.unwrap_or_else(|e| {
            warn!("Listing coupons failed, returning none: {}", e);
            Vec::new()
        })
    }

    pub async fn coupons_for_email(&self, email: &str) -> Vec<Coupon> {
        let email = email.trim().to_lowercase();
        self.db.coupons.find_all_by_email(&email).await.unwrap_or_else(|e| {
            warn!("Listing coupons for {} failed, returning none: {}", email, e);
            Vec::new()
        })
    }

    pub async fn referrals_for_email(&self, email: &str, role: ReferralRole) -> Vec<Referral> {
        let email = email.trim().to_lowercase();
        self.db
            .referrals
            .find_all_by_email(role, &email)
            .await
            .unwrap_or_else(|e| {
                warn!("Listing referrals for {} failed, returning none: {}", email, e);
                Vec::new()
            })
    }
}

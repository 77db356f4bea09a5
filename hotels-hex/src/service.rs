//! Hotel Booking Application Service
//!
//! Orchestrates domain operations through the repository and payment ports.
//! Contains NO infrastructure logic - pure business orchestration.

use validator::Validate;

use hotels_repo::security::{hash_password, verify_password};
use hotels_types::{
    AppError, Booking, CreateBookingRequest, CreateHotelRequest, Currency, Hotel, HotelId,
    HotelRepository, HotelSearch, HotelSearchQuery, HotelSearchResponse, LoginRequest, NewUser,
    PaginationMeta, PaymentGateway, PaymentIntentRequest, PaymentIntentResponse, PaymentMetadata,
    RegisterRequest, RepoError, User, UserId,
};

/// Application service for hotel search, listing and bookings.
///
/// Generic over `R: HotelRepository` and `P: PaymentGateway`; both adapters
/// are injected at compile time so tests can swap in in-memory doubles.
pub struct HotelService<R: HotelRepository, P: PaymentGateway> {
    repo: R,
    payments: P,
    currency: Currency,
}

impl<R: HotelRepository, P: PaymentGateway> HotelService<R, P> {
    /// Creates a new service charging in GBP.
    pub fn new(repo: R, payments: P) -> Self {
        Self {
            repo,
            payments,
            currency: Currency::GBP,
        }
    }

    /// Sets the currency payment intents are created in.
    pub fn with_currency(mut self, currency: Currency) -> Self {
        self.currency = currency;
        self
    }

    /// Returns a reference to the underlying repository.
    pub fn repo(&self) -> &R {
        &self.repo
    }

    /// Returns a reference to the payment gateway.
    pub fn payments(&self) -> &P {
        &self.payments
    }

    pub fn currency(&self) -> Currency {
        self.currency
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Users
    // ─────────────────────────────────────────────────────────────────────────────

    /// Registers a new user with a hashed password.
    pub async fn register(&self, req: RegisterRequest) -> Result<User, AppError> {
        req.validate()?;

        let password_hash = hash_password(&req.password).map_err(|e| {
            tracing::error!("Password hashing failed: {}", e);
            AppError::Internal(e.to_string())
        })?;

        let user = self
            .repo
            .create_user(NewUser::new(
                &req.email,
                &req.first_name,
                &req.last_name,
                password_hash,
            ))
            .await?;

        tracing::info!(user_id = %user.id, "User registered");
        Ok(user)
    }

    /// Checks credentials. Unknown email and wrong password are indistinguishable.
    pub async fn login(&self, req: LoginRequest) -> Result<User, AppError> {
        req.validate()?;

        let invalid = || AppError::BadRequest("Invalid credentials".into());

        let user = self
            .repo
            .find_user_by_email(&req.email)
            .await?
            .ok_or_else(invalid)?;

        if !verify_password(&req.password, &user.password_hash) {
            return Err(invalid());
        }

        Ok(user)
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Hotels
    // ─────────────────────────────────────────────────────────────────────────────

    /// Searches hotels and returns one page plus pagination metadata.
    pub async fn search_hotels(
        &self,
        query: HotelSearchQuery,
    ) -> Result<HotelSearchResponse, AppError> {
        let search = HotelSearch::from_query(query)?;
        let page = self.repo.search_hotels(&search).await?;

        Ok(HotelSearchResponse {
            data: page.hotels,
            pagination: PaginationMeta {
                total: page.total,
                page: search.page,
                pages: search.pages(page.total),
            },
        })
    }

    /// Lists all hotels, most recently updated first.
    pub async fn list_hotels(&self) -> Result<Vec<Hotel>, AppError> {
        self.repo.list_hotels().await.map_err(Into::into)
    }

    /// Gets a hotel by ID.
    pub async fn get_hotel(&self, id: HotelId) -> Result<Hotel, AppError> {
        self.repo
            .get_hotel(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Hotel not found".into()))
    }

    /// Lists a new hotel owned by `owner`.
    pub async fn create_hotel(
        &self,
        owner: UserId,
        req: CreateHotelRequest,
    ) -> Result<Hotel, AppError> {
        let hotel = Hotel::new(owner, req)?;
        let hotel = self.repo.create_hotel(hotel).await?;

        tracing::info!(hotel_id = %hotel.id, owner_id = %owner, "Hotel created");
        Ok(hotel)
    }

    /// Lists hotels owned by `owner`.
    pub async fn list_my_hotels(&self, owner: UserId) -> Result<Vec<Hotel>, AppError> {
        self.repo
            .list_hotels_by_owner(owner)
            .await
            .map_err(Into::into)
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Bookings
    // ─────────────────────────────────────────────────────────────────────────────

    /// Phase one: prices the stay and opens a payment intent with the provider.
    pub async fn create_payment_intent(
        &self,
        hotel_id: HotelId,
        user_id: UserId,
        req: PaymentIntentRequest,
    ) -> Result<PaymentIntentResponse, AppError> {
        let hotel = self.get_hotel(hotel_id).await?;
        let total = hotel.total_cost(req.number_of_nights, self.currency)?;

        let intent = self
            .payments
            .create_payment_intent(total, PaymentMetadata::new(hotel_id, user_id))
            .await
            .map_err(|e| {
                tracing::error!(%hotel_id, "Error creating payment intent: {}", e);
                AppError::Internal("Error creating payment intent".into())
            })?;

        let Some(client_secret) = intent.client_secret else {
            tracing::error!(payment_intent_id = %intent.id, "Error creating payment intent: no client secret");
            return Err(AppError::Internal("Error creating payment intent".into()));
        };

        tracing::info!(payment_intent_id = %intent.id, total = total.amount(), "Payment intent created");
        Ok(PaymentIntentResponse {
            payment_intent_id: intent.id,
            client_secret,
            total_cost: total.amount(),
        })
    }

    /// Phase two: verifies the intent with the provider and records the booking.
    pub async fn create_booking(
        &self,
        hotel_id: HotelId,
        user_id: UserId,
        req: CreateBookingRequest,
    ) -> Result<Booking, AppError> {
        req.validate()?;
        let (payment_intent_id, details) = req.into_parts();

        let intent = self
            .payments
            .retrieve_payment_intent(&payment_intent_id)
            .await?
            .ok_or_else(|| AppError::BadRequest("Payment intent not found".into()))?;

        if !intent.metadata.matches(hotel_id, user_id) {
            return Err(AppError::BadRequest("Payment intent mismatch".into()));
        }

        if !intent.is_succeeded() {
            return Err(AppError::BadRequest(format!(
                "Payment intent not succeeded. Status: {}",
                intent.status
            )));
        }

        let booking = Booking::confirm(hotel_id, user_id, &intent, details)?;
        let booking = self.repo.add_booking(booking).await.map_err(|e| match e {
            RepoError::NotFound => AppError::NotFound("Hotel not found".into()),
            e => e.into(),
        })?;

        tracing::info!(booking_id = %booking.id, %hotel_id, "Booking confirmed");
        Ok(booking)
    }

    /// Hotels the user has booked, each with only their bookings.
    pub async fn my_bookings(&self, user_id: UserId) -> Result<Vec<Hotel>, AppError> {
        self.repo
            .list_hotels_booked_by(user_id)
            .await
            .map_err(Into::into)
    }
}

//! HotelService unit tests.

#[cfg(test)]
pub(crate) mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::{Duration, Utc};

    use hotels_types::{
        AppError, Booking, CreateBookingRequest, CreateHotelRequest, Currency, Hotel, HotelId,
        HotelRepository, HotelSearch, HotelSearchQuery, LoginRequest, Money, NewUser,
        PaymentError, PaymentGateway, PaymentIntent, PaymentIntentRequest, PaymentIntentStatus,
        PaymentMetadata, RegisterRequest, RepoError, SearchPage, User, UserId,
    };

    use crate::HotelService;

    /// Simple in-memory repository for testing the service layer.
    #[derive(Default)]
    pub struct MockRepo {
        users: Mutex<Vec<User>>,
        hotels: Mutex<Vec<Hotel>>,
    }

    #[async_trait]
    impl HotelRepository for MockRepo {
        async fn create_user(&self, user: NewUser) -> Result<User, RepoError> {
            let mut users = self.users.lock().unwrap();
            if users.iter().any(|u| u.email == user.email) {
                return Err(RepoError::Conflict("User already exists".into()));
            }
            let user = user.into_user(UserId::new(), Utc::now());
            users.push(user.clone());
            Ok(user)
        }

        async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
            let email = email.trim().to_lowercase();
            Ok(self
                .users
                .lock()
                .unwrap()
                .iter()
                .find(|u| u.email == email)
                .cloned())
        }

        async fn get_user(&self, id: UserId) -> Result<Option<User>, RepoError> {
            Ok(self.users.lock().unwrap().iter().find(|u| u.id == id).cloned())
        }

        async fn create_hotel(&self, hotel: Hotel) -> Result<Hotel, RepoError> {
            self.hotels.lock().unwrap().push(hotel.clone());
            Ok(hotel)
        }

        async fn get_hotel(&self, id: HotelId) -> Result<Option<Hotel>, RepoError> {
            Ok(self.hotels.lock().unwrap().iter().find(|h| h.id == id).cloned())
        }

        async fn list_hotels(&self) -> Result<Vec<Hotel>, RepoError> {
            Ok(self.hotels.lock().unwrap().clone())
        }

        async fn list_hotels_by_owner(&self, owner: UserId) -> Result<Vec<Hotel>, RepoError> {
            Ok(self
                .hotels
                .lock()
                .unwrap()
                .iter()
                .filter(|h| h.owner_id == owner)
                .cloned()
                .collect())
        }

        /// Ignores filters; only paging matters to the service.
        async fn search_hotels(&self, search: &HotelSearch) -> Result<SearchPage, RepoError> {
            let hotels = self.hotels.lock().unwrap();
            Ok(SearchPage {
                hotels: hotels
                    .iter()
                    .skip(search.offset() as usize)
                    .take(search.page_size as usize)
                    .cloned()
                    .collect(),
                total: hotels.len() as u64,
            })
        }

        async fn add_booking(&self, booking: Booking) -> Result<Booking, RepoError> {
            let mut hotels = self.hotels.lock().unwrap();
            if hotels
                .iter()
                .flat_map(|h| &h.bookings)
                .any(|b| b.payment_intent_id == booking.payment_intent_id)
            {
                return Err(RepoError::Conflict("Payment intent already used".into()));
            }
            let hotel = hotels
                .iter_mut()
                .find(|h| h.id == booking.hotel_id)
                .ok_or(RepoError::NotFound)?;
            hotel.bookings.push(booking.clone());
            Ok(booking)
        }

        async fn list_hotels_booked_by(&self, user: UserId) -> Result<Vec<Hotel>, RepoError> {
            Ok(self
                .hotels
                .lock()
                .unwrap()
                .iter()
                .filter(|h| h.bookings.iter().any(|b| b.user_id == user))
                .map(|h| {
                    let mut h = h.clone();
                    h.bookings.retain(|b| b.user_id == user);
                    h
                })
                .collect())
        }
    }

    /// Payment gateway double holding intents in memory.
    #[derive(Default)]
    pub struct MockGateway {
        intents: Mutex<HashMap<String, PaymentIntent>>,
        unavailable: bool,
        omit_client_secret: bool,
    }

    impl MockGateway {
        pub fn unavailable() -> Self {
            Self {
                unavailable: true,
                ..Default::default()
            }
        }

        /// Simulates the guest completing payment in the browser.
        pub fn set_status(&self, id: &str, status: PaymentIntentStatus) {
            if let Some(intent) = self.intents.lock().unwrap().get_mut(id) {
                intent.status = status;
            }
        }

        pub fn insert(&self, intent: PaymentIntent) {
            self.intents.lock().unwrap().insert(intent.id.clone(), intent);
        }
    }

    #[async_trait]
    impl PaymentGateway for MockGateway {
        async fn create_payment_intent(
            &self,
            amount: Money,
            metadata: PaymentMetadata,
        ) -> Result<PaymentIntent, PaymentError> {
            if self.unavailable {
                return Err(PaymentError::Unavailable("connection refused".into()));
            }
            let mut intents = self.intents.lock().unwrap();
            let id = format!("pi_{}", intents.len() + 1);
            let intent = PaymentIntent {
                id: id.clone(),
                amount,
                status: PaymentIntentStatus::RequiresPaymentMethod,
                client_secret: (!self.omit_client_secret).then(|| format!("{}_secret", id)),
                metadata,
            };
            intents.insert(id, intent.clone());
            Ok(intent)
        }

        async fn retrieve_payment_intent(
            &self,
            id: &str,
        ) -> Result<Option<PaymentIntent>, PaymentError> {
            if self.unavailable {
                return Err(PaymentError::Unavailable("connection refused".into()));
            }
            Ok(self.intents.lock().unwrap().get(id).cloned())
        }
    }

    fn setup() -> HotelService<MockRepo, MockGateway> {
        HotelService::new(MockRepo::default(), MockGateway::default())
    }

    fn hotel_request(name: &str, price: i64) -> CreateHotelRequest {
        CreateHotelRequest {
            name: name.into(),
            city: "Brighton".into(),
            country: "United Kingdom".into(),
            description: "By the sea".into(),
            hotel_type: "Boutique".into(),
            adult_count: 2,
            child_count: 0,
            facilities: vec!["Free WiFi".into()],
            price_per_night: price,
            star_rating: 4,
            image_urls: vec![],
        }
    }

    fn booking_request(intent_id: &str) -> CreateBookingRequest {
        let check_in = Utc::now() + Duration::days(7);
        CreateBookingRequest {
            payment_intent_id: intent_id.into(),
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            email: "ada@example.com".into(),
            adult_count: 2,
            child_count: 0,
            check_in,
            check_out: check_in + Duration::days(3),
        }
    }

    fn register_request(email: &str, password: &str) -> RegisterRequest {
        RegisterRequest {
            email: email.into(),
            password: password.into(),
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Users
    // ─────────────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_register_then_login() {
        let service = setup();

        let user = service
            .register(register_request("Ada@Example.com", "secret123"))
            .await
            .unwrap();
        assert_eq!(user.email, "ada@example.com");
        assert_ne!(user.password_hash, "secret123");

        let logged_in = service
            .login(LoginRequest {
                email: "ada@example.com".into(),
                password: "secret123".into(),
            })
            .await
            .unwrap();
        assert_eq!(logged_in.id, user.id);
    }

    #[tokio::test]
    async fn test_register_rejects_invalid_input() {
        let service = setup();

        let result = service.register(register_request("nope", "123")).await;

        assert!(
            matches!(result, Err(AppError::BadRequest(msg)) if msg.contains("email") && msg.contains("password"))
        );
    }

    #[tokio::test]
    async fn test_register_duplicate_email_conflicts() {
        let service = setup();
        service
            .register(register_request("ada@example.com", "secret123"))
            .await
            .unwrap();

        let result = service
            .register(register_request("ADA@example.com", "other-secret"))
            .await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_login_failures_are_indistinguishable() {
        let service = setup();
        service
            .register(register_request("ada@example.com", "secret123"))
            .await
            .unwrap();

        let wrong_password = service
            .login(LoginRequest {
                email: "ada@example.com".into(),
                password: "secret124".into(),
            })
            .await;
        let unknown_email = service
            .login(LoginRequest {
                email: "bob@example.com".into(),
                password: "secret123".into(),
            })
            .await;

        for result in [wrong_password, unknown_email] {
            assert!(matches!(result, Err(AppError::BadRequest(msg)) if msg == "Invalid credentials"));
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Hotels
    // ─────────────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_search_pagination_metadata() {
        let service = setup();
        let owner = UserId::new();
        for i in 0..7 {
            service
                .create_hotel(owner, hotel_request(&format!("Hotel {}", i), 10_000))
                .await
                .unwrap();
        }

        let response = service
            .search_hotels(HotelSearchQuery {
                page: Some(2),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(response.data.len(), 2);
        assert_eq!(response.pagination.total, 7);
        assert_eq!(response.pagination.page, 2);
        assert_eq!(response.pagination.pages, 2);
    }

    #[tokio::test]
    async fn test_search_with_invalid_stars_is_bad_request() {
        let service = setup();

        let result = service
            .search_hotels(HotelSearchQuery {
                stars: vec![9],
                ..Default::default()
            })
            .await;

        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_get_missing_hotel() {
        let service = setup();

        let result = service.get_hotel(HotelId::new()).await;

        assert!(matches!(result, Err(AppError::NotFound(msg)) if msg == "Hotel not found"));
    }

    #[tokio::test]
    async fn test_create_hotel_validates() {
        let service = setup();

        let mut req = hotel_request("Inn", 100);
        req.star_rating = 0;

        assert!(matches!(
            service.create_hotel(UserId::new(), req).await,
            Err(AppError::BadRequest(_))
        ));
    }

    #[tokio::test]
    async fn test_list_my_hotels_only_returns_owned() {
        let service = setup();
        let alice = UserId::new();
        service
            .create_hotel(alice, hotel_request("Mine", 100))
            .await
            .unwrap();
        service
            .create_hotel(UserId::new(), hotel_request("Theirs", 100))
            .await
            .unwrap();

        let mine = service.list_my_hotels(alice).await.unwrap();

        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].name, "Mine");
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Payment intents
    // ─────────────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_payment_intent_prices_the_stay() {
        let service = setup().with_currency(Currency::EUR);
        let hotel = service
            .create_hotel(UserId::new(), hotel_request("Inn", 9_900))
            .await
            .unwrap();
        let guest = UserId::new();

        let response = service
            .create_payment_intent(hotel.id, guest, PaymentIntentRequest { number_of_nights: 3 })
            .await
            .unwrap();

        assert_eq!(response.total_cost, 29_700);
        assert_eq!(response.client_secret, format!("{}_secret", response.payment_intent_id));

        let intent = service
            .payments()
            .retrieve_payment_intent(&response.payment_intent_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(intent.amount.currency(), Currency::EUR);
        assert!(intent.metadata.matches(hotel.id, guest));
    }

    #[tokio::test]
    async fn test_payment_intent_for_missing_hotel() {
        let service = setup();

        let result = service
            .create_payment_intent(
                HotelId::new(),
                UserId::new(),
                PaymentIntentRequest { number_of_nights: 1 },
            )
            .await;

        assert!(matches!(result, Err(AppError::NotFound(msg)) if msg == "Hotel not found"));
    }

    #[tokio::test]
    async fn test_payment_intent_for_zero_nights() {
        let service = setup();
        let hotel = service
            .create_hotel(UserId::new(), hotel_request("Inn", 9_900))
            .await
            .unwrap();

        let result = service
            .create_payment_intent(hotel.id, UserId::new(), PaymentIntentRequest { number_of_nights: 0 })
            .await;

        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_payment_provider_failure_is_internal() {
        let service = HotelService::new(MockRepo::default(), MockGateway::unavailable());
        let hotel = service
            .create_hotel(UserId::new(), hotel_request("Inn", 9_900))
            .await
            .unwrap();

        let result = service
            .create_payment_intent(hotel.id, UserId::new(), PaymentIntentRequest { number_of_nights: 2 })
            .await;

        assert!(matches!(result, Err(AppError::Internal(msg)) if msg == "Error creating payment intent"));
    }

    #[tokio::test]
    async fn test_payment_intent_without_client_secret_is_internal() {
        let gateway = MockGateway {
            omit_client_secret: true,
            ..Default::default()
        };
        let service = HotelService::new(MockRepo::default(), gateway);
        let hotel = service
            .create_hotel(UserId::new(), hotel_request("Inn", 9_900))
            .await
            .unwrap();

        let result = service
            .create_payment_intent(hotel.id, UserId::new(), PaymentIntentRequest { number_of_nights: 2 })
            .await;

        assert!(matches!(result, Err(AppError::Internal(_))));
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Bookings
    // ─────────────────────────────────────────────────────────────────────────

    async fn paid_intent(
        service: &HotelService<MockRepo, MockGateway>,
        hotel_id: HotelId,
        guest: UserId,
    ) -> String {
        let response = service
            .create_payment_intent(hotel_id, guest, PaymentIntentRequest { number_of_nights: 3 })
            .await
            .unwrap();
        service
            .payments()
            .set_status(&response.payment_intent_id, PaymentIntentStatus::Succeeded);
        response.payment_intent_id
    }

    #[tokio::test]
    async fn test_booking_flow() {
        let service = setup();
        let hotel = service
            .create_hotel(UserId::new(), hotel_request("Inn", 9_900))
            .await
            .unwrap();
        let guest = UserId::new();
        let intent_id = paid_intent(&service, hotel.id, guest).await;

        let booking = service
            .create_booking(hotel.id, guest, booking_request(&intent_id))
            .await
            .unwrap();

        assert_eq!(booking.total_cost, 29_700);
        assert_eq!(booking.user_id, guest);
        assert_eq!(booking.payment_intent_id, intent_id);

        let stored = service.get_hotel(hotel.id).await.unwrap();
        assert_eq!(stored.bookings.len(), 1);

        let mine = service.my_bookings(guest).await.unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].id, hotel.id);
    }

    #[tokio::test]
    async fn test_booking_with_unknown_intent() {
        let service = setup();
        let hotel = service
            .create_hotel(UserId::new(), hotel_request("Inn", 9_900))
            .await
            .unwrap();

        let result = service
            .create_booking(hotel.id, UserId::new(), booking_request("pi_missing"))
            .await;

        assert!(matches!(result, Err(AppError::BadRequest(msg)) if msg == "Payment intent not found"));
    }

    #[tokio::test]
    async fn test_booking_by_another_user_is_a_mismatch() {
        let service = setup();
        let hotel = service
            .create_hotel(UserId::new(), hotel_request("Inn", 9_900))
            .await
            .unwrap();
        let intent_id = paid_intent(&service, hotel.id, UserId::new()).await;

        let result = service
            .create_booking(hotel.id, UserId::new(), booking_request(&intent_id))
            .await;

        assert!(matches!(result, Err(AppError::BadRequest(msg)) if msg == "Payment intent mismatch"));
    }

    #[tokio::test]
    async fn test_booking_for_another_hotel_is_a_mismatch() {
        let service = setup();
        let owner = UserId::new();
        let paid_for = service.create_hotel(owner, hotel_request("A", 100)).await.unwrap();
        let other = service.create_hotel(owner, hotel_request("B", 100)).await.unwrap();
        let guest = UserId::new();
        let intent_id = paid_intent(&service, paid_for.id, guest).await;

        let result = service
            .create_booking(other.id, guest, booking_request(&intent_id))
            .await;

        assert!(matches!(result, Err(AppError::BadRequest(msg)) if msg == "Payment intent mismatch"));
    }

    #[tokio::test]
    async fn test_booking_requires_succeeded_payment() {
        let service = setup();
        let hotel = service
            .create_hotel(UserId::new(), hotel_request("Inn", 9_900))
            .await
            .unwrap();
        let guest = UserId::new();
        let response = service
            .create_payment_intent(hotel.id, guest, PaymentIntentRequest { number_of_nights: 1 })
            .await
            .unwrap();

        let result = service
            .create_booking(hotel.id, guest, booking_request(&response.payment_intent_id))
            .await;

        assert!(matches!(
            result,
            Err(AppError::BadRequest(msg)) if msg == "Payment intent not succeeded. Status: requires_payment_method"
        ));
        assert!(service.get_hotel(hotel.id).await.unwrap().bookings.is_empty());
    }

    #[tokio::test]
    async fn test_booking_for_deleted_hotel_is_not_found() {
        let service = setup();
        let guest = UserId::new();
        let hotel_id = HotelId::new();
        service.payments().insert(PaymentIntent {
            id: "pi_orphan".into(),
            amount: Money::new(1_000, Currency::GBP).unwrap(),
            status: PaymentIntentStatus::Succeeded,
            client_secret: None,
            metadata: PaymentMetadata::new(hotel_id, guest),
        });

        let result = service
            .create_booking(hotel_id, guest, booking_request("pi_orphan"))
            .await;

        assert!(matches!(result, Err(AppError::NotFound(msg)) if msg == "Hotel not found"));
    }

    #[tokio::test]
    async fn test_payment_intent_cannot_book_twice() {
        let service = setup();
        let hotel = service
            .create_hotel(UserId::new(), hotel_request("Inn", 9_900))
            .await
            .unwrap();
        let guest = UserId::new();
        let intent_id = paid_intent(&service, hotel.id, guest).await;

        service
            .create_booking(hotel.id, guest, booking_request(&intent_id))
            .await
            .unwrap();
        let again = service
            .create_booking(hotel.id, guest, booking_request(&intent_id))
            .await;

        assert!(matches!(again, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_booking_with_inverted_dates_is_bad_request() {
        let service = setup();
        let hotel = service
            .create_hotel(UserId::new(), hotel_request("Inn", 9_900))
            .await
            .unwrap();
        let guest = UserId::new();
        let intent_id = paid_intent(&service, hotel.id, guest).await;

        let mut req = booking_request(&intent_id);
        std::mem::swap(&mut req.check_in, &mut req.check_out);

        let result = service.create_booking(hotel.id, guest, req).await;

        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }
}

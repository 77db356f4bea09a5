//! SQLite repository integration tests.

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};
    use hotels_types::{
        Booking, BookingId, CreateHotelRequest, Hotel, HotelId, HotelRepository, HotelSearch,
        HotelSearchQuery, NewUser, RepoError, SortOption, UserId,
    };

    use crate::SqliteRepo;

    async fn setup_repo() -> SqliteRepo {
        SqliteRepo::new("sqlite::memory:").await.unwrap()
    }

    fn new_hotel(owner: UserId, name: &str, city: &str, country: &str, price: i64) -> Hotel {
        Hotel::new(
            owner,
            CreateHotelRequest {
                name: name.to_string(),
                city: city.to_string(),
                country: country.to_string(),
                description: format!("{} in {}", name, city),
                hotel_type: "Budget".to_string(),
                adult_count: 2,
                child_count: 0,
                facilities: vec!["Free WiFi".to_string()],
                price_per_night: price,
                star_rating: 3,
                image_urls: vec![],
            },
        )
        .unwrap()
    }

    /// Inserts a hotel updated `minutes` after a fixed base time.
    async fn seed(repo: &SqliteRepo, mut hotel: Hotel, minutes: i64) -> Hotel {
        hotel.last_updated = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
            + Duration::minutes(minutes);
        repo.create_hotel(hotel).await.unwrap()
    }

    fn booking(hotel_id: HotelId, user_id: UserId, intent: &str) -> Booking {
        let check_in = Utc.with_ymd_and_hms(2024, 7, 1, 14, 0, 0).unwrap();
        Booking {
            id: BookingId::new(),
            hotel_id,
            user_id,
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            adult_count: 2,
            child_count: 0,
            check_in,
            check_out: check_in + Duration::days(3),
            total_cost: 29_700,
            payment_intent_id: intent.to_string(),
            created_at: Utc.with_ymd_and_hms(2024, 6, 2, 9, 30, 0).unwrap(),
        }
    }

    fn search(query: HotelSearchQuery) -> HotelSearch {
        HotelSearch::from_query(query).unwrap()
    }

    fn names(hotels: &[Hotel]) -> Vec<&str> {
        hotels.iter().map(|h| h.name.as_str()).collect()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Users
    // ─────────────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_create_and_find_user() {
        let repo = setup_repo().await;

        let user = repo
            .create_user(NewUser::new("Guest@Example.com", "Ada", "Lovelace", "hash".into()))
            .await
            .unwrap();

        let found = repo
            .find_user_by_email("GUEST@example.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, user.id);
        assert_eq!(found.email, "guest@example.com");
        assert_eq!(found.password_hash, "hash");

        let by_id = repo.get_user(user.id).await.unwrap().unwrap();
        assert_eq!(by_id.first_name, "Ada");
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts() {
        let repo = setup_repo().await;

        repo.create_user(NewUser::new("a@b.com", "A", "B", "h".into()))
            .await
            .unwrap();
        let result = repo
            .create_user(NewUser::new("A@B.com", "C", "D", "h".into()))
            .await;

        assert!(matches!(result, Err(RepoError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_unknown_user_is_none() {
        let repo = setup_repo().await;

        assert!(repo.get_user(UserId::new()).await.unwrap().is_none());
        assert!(repo.find_user_by_email("nobody@x.com").await.unwrap().is_none());
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Hotels
    // ─────────────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_hotel_roundtrip() {
        let repo = setup_repo().await;
        let mut hotel = new_hotel(UserId::new(), "Seaside Inn", "Brighton", "UK", 9_900);
        hotel.facilities = vec!["Spa".into(), "Parking".into()];
        hotel.image_urls = vec!["https://img.example.com/1.jpg".into()];
        let created = seed(&repo, hotel, 0).await;

        let fetched = repo.get_hotel(created.id).await.unwrap().unwrap();

        assert_eq!(fetched.name, "Seaside Inn");
        assert_eq!(fetched.owner_id, created.owner_id);
        assert_eq!(fetched.facilities, vec!["Spa", "Parking"]);
        assert_eq!(fetched.image_urls, created.image_urls);
        assert_eq!(fetched.last_updated, created.last_updated);
        assert!(fetched.bookings.is_empty());
    }

    #[tokio::test]
    async fn test_get_hotel_not_found() {
        let repo = setup_repo().await;

        assert!(repo.get_hotel(HotelId::new()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_hotels_most_recent_first() {
        let repo = setup_repo().await;
        let owner = UserId::new();
        seed(&repo, new_hotel(owner, "Old", "Bath", "UK", 100), 0).await;
        seed(&repo, new_hotel(owner, "New", "Bath", "UK", 100), 10).await;
        seed(&repo, new_hotel(owner, "Mid", "Bath", "UK", 100), 5).await;

        let hotels = repo.list_hotels().await.unwrap();

        assert_eq!(names(&hotels), vec!["New", "Mid", "Old"]);
    }

    #[tokio::test]
    async fn test_list_hotels_by_owner() {
        let repo = setup_repo().await;
        let alice = UserId::new();
        let bob = UserId::new();
        seed(&repo, new_hotel(alice, "Alice's", "York", "UK", 100), 0).await;
        seed(&repo, new_hotel(bob, "Bob's", "York", "UK", 100), 1).await;

        let hotels = repo.list_hotels_by_owner(alice).await.unwrap();

        assert_eq!(names(&hotels), vec!["Alice's"]);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Search
    // ─────────────────────────────────────────────────────────────────────────

    async fn seed_catalogue(repo: &SqliteRepo) {
        let owner = UserId::new();

        let mut ritz = new_hotel(owner, "Ritz", "London", "United Kingdom", 50_000);
        ritz.star_rating = 5;
        ritz.hotel_type = "Luxury".into();
        ritz.adult_count = 4;
        ritz.child_count = 2;
        ritz.facilities = vec!["Spa".into(), "Parking".into(), "Free WiFi".into()];
        seed(repo, ritz, 0).await;

        let mut hostel = new_hotel(owner, "Hostel", "London", "United Kingdom", 2_500);
        hostel.star_rating = 1;
        hostel.hotel_type = "Hostel".into();
        seed(repo, hostel, 1).await;

        let mut louvre = new_hotel(owner, "Louvre", "Paris", "France", 20_000);
        louvre.star_rating = 4;
        louvre.hotel_type = "Boutique".into();
        louvre.facilities = vec!["Spa".into()];
        seed(repo, louvre, 2).await;

        let mut lakes = new_hotel(owner, "Lakes", "Keswick", "United Kingdom", 8_000);
        lakes.star_rating = 3;
        lakes.facilities = vec!["Parking".into()];
        seed(repo, lakes, 3).await;
    }

    #[tokio::test]
    async fn test_empty_search_returns_everything() {
        let repo = setup_repo().await;
        seed_catalogue(&repo).await;

        let page = repo
            .search_hotels(&search(HotelSearchQuery::default()))
            .await
            .unwrap();

        assert_eq!(page.total, 4);
        assert_eq!(names(&page.hotels), vec!["Lakes", "Louvre", "Hostel", "Ritz"]);
    }

    #[tokio::test]
    async fn test_destination_matches_city_or_country_case_insensitively() {
        let repo = setup_repo().await;
        seed_catalogue(&repo).await;

        let by_city = repo
            .search_hotels(&search(HotelSearchQuery {
                destination: Some("LONDON".into()),
                ..Default::default()
            }))
            .await
            .unwrap();
        assert_eq!(by_city.total, 2);

        let by_country = repo
            .search_hotels(&search(HotelSearchQuery {
                destination: Some("kingdom".into()),
                ..Default::default()
            }))
            .await
            .unwrap();
        assert_eq!(by_country.total, 3);
    }

    #[tokio::test]
    async fn test_destination_with_non_ascii_letters() {
        let repo = setup_repo().await;
        let owner = UserId::new();
        seed(&repo, new_hotel(owner, "Phare", "ÎLE-DE-BATZ", "France", 8_000), 0).await;

        let exact = repo
            .search_hotels(&search(HotelSearchQuery {
                destination: Some("ÎLE-DE-BATZ".into()),
                ..Default::default()
            }))
            .await
            .unwrap();
        assert_eq!(names(&exact.hotels), vec!["Phare"]);

        // ASCII letters still fold around the non-ASCII ones
        let mixed = repo
            .search_hotels(&search(HotelSearchQuery {
                destination: Some("Île-de-batz".into()),
                ..Default::default()
            }))
            .await
            .unwrap();
        assert_eq!(mixed.total, 1);
    }

    #[tokio::test]
    async fn test_destination_wildcards_match_literally() {
        let repo = setup_repo().await;
        seed_catalogue(&repo).await;

        let page = repo
            .search_hotels(&search(HotelSearchQuery {
                destination: Some("%".into()),
                ..Default::default()
            }))
            .await
            .unwrap();

        assert_eq!(page.total, 0);
    }

    #[tokio::test]
    async fn test_capacity_filters() {
        let repo = setup_repo().await;
        seed_catalogue(&repo).await;

        let page = repo
            .search_hotels(&search(HotelSearchQuery {
                adult_count: Some(3),
                child_count: Some(1),
                ..Default::default()
            }))
            .await
            .unwrap();

        assert_eq!(names(&page.hotels), vec!["Ritz"]);
    }

    #[tokio::test]
    async fn test_every_requested_facility_must_be_present() {
        let repo = setup_repo().await;
        seed_catalogue(&repo).await;

        let page = repo
            .search_hotels(&search(HotelSearchQuery {
                facilities: vec!["Spa".into(), "Parking".into()],
                ..Default::default()
            }))
            .await
            .unwrap();

        assert_eq!(names(&page.hotels), vec!["Ritz"]);
    }

    #[tokio::test]
    async fn test_type_and_star_filters_accept_any_listed_value() {
        let repo = setup_repo().await;
        seed_catalogue(&repo).await;

        let by_type = repo
            .search_hotels(&search(HotelSearchQuery {
                types: vec!["Hostel".into(), "Boutique".into()],
                ..Default::default()
            }))
            .await
            .unwrap();
        assert_eq!(names(&by_type.hotels), vec!["Louvre", "Hostel"]);

        let by_stars = repo
            .search_hotels(&search(HotelSearchQuery {
                stars: vec![4, 5],
                ..Default::default()
            }))
            .await
            .unwrap();
        assert_eq!(names(&by_stars.hotels), vec!["Louvre", "Ritz"]);
    }

    #[tokio::test]
    async fn test_max_price_is_inclusive() {
        let repo = setup_repo().await;
        seed_catalogue(&repo).await;

        let page = repo
            .search_hotels(&search(HotelSearchQuery {
                max_price: Some(8_000),
                ..Default::default()
            }))
            .await
            .unwrap();

        assert_eq!(names(&page.hotels), vec!["Lakes", "Hostel"]);
    }

    #[tokio::test]
    async fn test_sort_options() {
        let repo = setup_repo().await;
        seed_catalogue(&repo).await;

        let sorted = |sort| {
            search(HotelSearchQuery {
                sort_option: Some(sort),
                ..Default::default()
            })
        };

        let stars = repo
            .search_hotels(&sorted(SortOption::StarRating))
            .await
            .unwrap();
        assert_eq!(names(&stars.hotels), vec!["Ritz", "Louvre", "Lakes", "Hostel"]);

        let cheapest = repo
            .search_hotels(&sorted(SortOption::PricePerNightAsc))
            .await
            .unwrap();
        assert_eq!(names(&cheapest.hotels), vec!["Hostel", "Lakes", "Louvre", "Ritz"]);

        let dearest = repo
            .search_hotels(&sorted(SortOption::PricePerNightDesc))
            .await
            .unwrap();
        assert_eq!(names(&dearest.hotels), vec!["Ritz", "Louvre", "Lakes", "Hostel"]);
    }

    #[tokio::test]
    async fn test_pagination() {
        let repo = setup_repo().await;
        let owner = UserId::new();
        for i in 0..7 {
            seed(&repo, new_hotel(owner, &format!("H{}", i), "Leeds", "UK", 1_000), i).await;
        }

        let first = repo
            .search_hotels(&search(HotelSearchQuery::default()))
            .await
            .unwrap();
        assert_eq!(first.total, 7);
        assert_eq!(names(&first.hotels), vec!["H6", "H5", "H4", "H3", "H2"]);

        let second = repo
            .search_hotels(&search(HotelSearchQuery {
                page: Some(2),
                ..Default::default()
            }))
            .await
            .unwrap();
        assert_eq!(second.total, 7);
        assert_eq!(names(&second.hotels), vec!["H1", "H0"]);

        let beyond = repo
            .search_hotels(&search(HotelSearchQuery {
                page: Some(9),
                ..Default::default()
            }))
            .await
            .unwrap();
        assert_eq!(beyond.total, 7);
        assert!(beyond.hotels.is_empty());
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Bookings
    // ─────────────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_add_booking_appears_on_hotel() {
        let repo = setup_repo().await;
        let hotel = seed(&repo, new_hotel(UserId::new(), "Inn", "Ely", "UK", 9_900), 0).await;
        let guest = UserId::new();

        let stored = repo
            .add_booking(booking(hotel.id, guest, "pi_1"))
            .await
            .unwrap();

        let fetched = repo.get_hotel(hotel.id).await.unwrap().unwrap();
        assert_eq!(fetched.bookings.len(), 1);
        let b = &fetched.bookings[0];
        assert_eq!(b.id, stored.id);
        assert_eq!(b.user_id, guest);
        assert_eq!(b.total_cost, 29_700);
        assert_eq!(b.check_in, stored.check_in);
        assert_eq!(b.check_out, stored.check_out);
        assert_eq!(fetched.last_updated, hotel.last_updated);
    }

    #[tokio::test]
    async fn test_add_booking_to_missing_hotel_fails() {
        let repo = setup_repo().await;

        let result = repo
            .add_booking(booking(HotelId::new(), UserId::new(), "pi_1"))
            .await;

        assert!(matches!(result, Err(RepoError::NotFound)));
    }

    #[tokio::test]
    async fn test_payment_intent_cannot_be_reused() {
        let repo = setup_repo().await;
        let hotel = seed(&repo, new_hotel(UserId::new(), "Inn", "Ely", "UK", 9_900), 0).await;
        let guest = UserId::new();

        repo.add_booking(booking(hotel.id, guest, "pi_1"))
            .await
            .unwrap();
        let result = repo.add_booking(booking(hotel.id, guest, "pi_1")).await;

        assert!(matches!(result, Err(RepoError::Conflict(_))));
        let fetched = repo.get_hotel(hotel.id).await.unwrap().unwrap();
        assert_eq!(fetched.bookings.len(), 1);
    }

    #[tokio::test]
    async fn test_hotels_booked_by_user_carry_only_their_bookings() {
        let repo = setup_repo().await;
        let owner = UserId::new();
        let inn = seed(&repo, new_hotel(owner, "Inn", "Ely", "UK", 9_900), 0).await;
        let lodge = seed(&repo, new_hotel(owner, "Lodge", "Ely", "UK", 9_900), 1).await;
        seed(&repo, new_hotel(owner, "Unbooked", "Ely", "UK", 9_900), 2).await;

        let alice = UserId::new();
        let bob = UserId::new();
        repo.add_booking(booking(inn.id, alice, "pi_a1")).await.unwrap();
        repo.add_booking(booking(inn.id, bob, "pi_b1")).await.unwrap();
        repo.add_booking(booking(lodge.id, alice, "pi_a2")).await.unwrap();

        let hotels = repo.list_hotels_booked_by(alice).await.unwrap();

        assert_eq!(names(&hotels), vec!["Lodge", "Inn"]);
        assert!(
            hotels
                .iter()
                .flat_map(|h| &h.bookings)
                .all(|b| b.user_id == alice)
        );
        assert_eq!(hotels[1].bookings.len(), 1);

        assert!(repo.list_hotels_booked_by(UserId::new()).await.unwrap().is_empty());
    }
}

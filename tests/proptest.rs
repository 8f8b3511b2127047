use std::sync::Arc;

use axum::http::StatusCode;
use axum_test::TestServer;
use proptest::prelude::*;
use serde_json::{Value, json};

use agro::{
    CpfCnpj, DocumentKind, Farmer, FarmerChanges, FarmerError, FarmingOption,
    InMemoryFarmerRepository, NewFarmer, create_app, normalize_farming_options,
    validate_total_area,
};

/// Test infrastructure for property testing the agro API
pub struct ApiTestServer {
    pub server: TestServer,
    pub repository: Arc<InMemoryFarmerRepository>,
}

impl Default for ApiTestServer {
    fn default() -> Self {
        Self::new()
    }
}

impl ApiTestServer {
    /// Create a new test server over a fresh in-memory repository
    pub fn new() -> Self {
        let repository = Arc::new(InMemoryFarmerRepository::new());
        let server = TestServer::new(create_app(repository.clone())).unwrap();
        Self { server, repository }
    }
}

/// Property test strategies for generating test data
pub mod strategies {
    use super::*;
    use proptest::collection::vec;
    use proptest::string::string_regex;

    /// Strategy for generating a single farming option
    pub fn farming_option_strategy() -> impl Strategy<Value = FarmingOption> {
        prop::sample::select(FarmingOption::ALL.to_vec())
    }

    /// Strategy for generating option lists, duplicates included
    pub fn farming_options_strategy() -> impl Strategy<Value = Vec<FarmingOption>> {
        vec(farming_option_strategy(), 0..8)
    }

    /// Strategy for generating valid CPFs from random base digits
    pub fn cpf_strategy() -> impl Strategy<Value = CpfCnpj> {
        string_regex("[0-9]{9}")
            .unwrap()
            .prop_filter_map("repeated digits", |base| CpfCnpj::complete(&base).ok())
    }

    /// Strategy for generating valid CNPJs from random base digits
    pub fn cnpj_strategy() -> impl Strategy<Value = CpfCnpj> {
        string_regex("[0-9]{12}")
            .unwrap()
            .prop_filter_map("repeated digits", |base| CpfCnpj::complete(&base).ok())
    }

    /// Strategy for generating an area triple that satisfies the invariant
    pub fn valid_areas_strategy() -> impl Strategy<Value = (i32, i32, i32)> {
        (0..10_000i32, 0..10_000i32, 0..10_000i32)
            .prop_map(|(agricultural, vegetation, spare)| {
                (agricultural + vegetation + spare, agricultural, vegetation)
            })
    }

    /// Strategy for generating valid registrations
    pub fn new_farmer_strategy() -> impl Strategy<Value = NewFarmer> {
        (
            prop_oneof![cpf_strategy(), cnpj_strategy()],
            string_regex("[A-Za-z ]{1,40}").unwrap(),
            valid_areas_strategy(),
            farming_options_strategy(),
        )
            .prop_map(|(cpf_cnpj, name, (total, agricultural, vegetation), options)| {
                NewFarmer {
                    cpf_cnpj,
                    name,
                    farm_name: "Fazenda LOTR".to_string(),
                    city: "Joao Pessoa".to_string(),
                    state: "PB".to_string(),
                    total_area: total,
                    agricultural_area: agricultural,
                    vegetation_area: vegetation,
                    farming_options: agro::dedup_farming_options(options),
                }
            })
    }
}

fn body_for(data: &NewFarmer) -> Value {
    json!({
        "cpf_cnpj": data.cpf_cnpj,
        "name": data.name,
        "farm_name": data.farm_name,
        "city": data.city,
        "state": data.state,
        "total_area": data.total_area,
        "agricultural_area": data.agricultural_area,
        "vegetation_area": data.vegetation_area,
        "farming_options": data.farming_options,
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn area_invariant_matches_arithmetic(
        total in 0..i32::MAX,
        agricultural in 0..i32::MAX,
        vegetation in 0..i32::MAX,
    ) {
        let holds = i64::from(agricultural) + i64::from(vegetation) <= i64::from(total);
        prop_assert_eq!(validate_total_area(total, agricultural, vegetation).is_ok(), holds);
    }

    #[test]
    fn normalized_options_are_the_union_without_duplicates(
        existing in strategies::farming_options_strategy(),
        new in strategies::farming_options_strategy(),
    ) {
        let merged = normalize_farming_options(&existing, &new);
        if new.is_empty() {
            prop_assert_eq!(merged, existing);
        } else {
            for option in existing.iter().chain(new.iter()) {
                prop_assert!(merged.contains(option));
            }
            for option in &merged {
                prop_assert!(existing.contains(option) || new.contains(option));
                prop_assert_eq!(merged.iter().filter(|o| *o == option).count(), 1);
            }
        }
    }

    #[test]
    fn completed_cpf_parses_back(cpf in strategies::cpf_strategy()) {
        prop_assert_eq!(cpf.kind(), DocumentKind::Cpf);
        prop_assert_eq!(CpfCnpj::parse(cpf.as_str()), Ok(cpf.clone()));
    }

    #[test]
    fn completed_cnpj_parses_back(cnpj in strategies::cnpj_strategy()) {
        prop_assert_eq!(cnpj.kind(), DocumentKind::Cnpj);
        prop_assert_eq!(CpfCnpj::parse(cnpj.as_str()), Ok(cnpj.clone()));
    }

    #[test]
    fn altered_check_digit_is_rejected(cpf in strategies::cpf_strategy(), delta in 1u8..10) {
        let mut digits: Vec<u8> = cpf.as_str().bytes().collect();
        let last = digits.len() - 1;
        digits[last] = b'0' + (digits[last] - b'0' + delta) % 10;
        let altered = String::from_utf8(digits).unwrap();
        prop_assert!(CpfCnpj::parse(&altered).is_err());
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn duplicate_create_keeps_one_row(data in strategies::new_farmer_strategy()) {
        tokio::runtime::Runtime::new().unwrap().block_on(async {
            let repository = InMemoryFarmerRepository::new();
            let created = Farmer::create(data.clone(), &repository).await;
            prop_assert!(created.is_ok());
            let again = Farmer::create(data, &repository).await;
            prop_assert_eq!(again, Err(FarmerError::AlreadyRegistered));
            prop_assert_eq!(Farmer::get_all(20, 0, &repository).await.unwrap().len(), 1);
            Ok(())
        })?;
    }

    #[test]
    fn update_never_breaks_area_invariant(
        data in strategies::new_farmer_strategy(),
        total in proptest::option::of(0..20_000i32),
        agricultural in proptest::option::of(0..20_000i32),
        vegetation in proptest::option::of(0..20_000i32),
    ) {
        tokio::runtime::Runtime::new().unwrap().block_on(async {
            let repository = InMemoryFarmerRepository::new();
            let created = Farmer::create(data, &repository).await.unwrap();
            let changes = FarmerChanges {
                total_area: total,
                agricultural_area: agricultural,
                vegetation_area: vegetation,
                ..FarmerChanges::default()
            };
            let result = Farmer::update(&created.cpf_cnpj, changes, &repository).await;
            let stored = Farmer::get_all(1, 0, &repository).await.unwrap().remove(0);
            prop_assert!(
                i64::from(stored.agricultural_area) + i64::from(stored.vegetation_area)
                    <= i64::from(stored.total_area)
            );
            if result.is_err() {
                prop_assert_eq!(stored, created);
            }
            Ok(())
        })?;
    }

    #[test]
    fn api_create_then_list(data in strategies::new_farmer_strategy()) {
        tokio::runtime::Runtime::new().unwrap().block_on(async {
            let test_server = ApiTestServer::new();

            let response = test_server.server
                .post("/api/v1/farmers")
                .json(&body_for(&data))
                .await;
            response.assert_status(StatusCode::CREATED);
            let created: Farmer = response.json();
            prop_assert_eq!(&created.cpf_cnpj, data.cpf_cnpj.as_str());
            prop_assert_eq!(created.insert_at, created.update_at);

            let listed = Farmer::get_all(20, 0, test_server.repository.as_ref())
                .await
                .unwrap();
            prop_assert_eq!(listed, vec![created]);
            Ok(())
        })?;
    }
}

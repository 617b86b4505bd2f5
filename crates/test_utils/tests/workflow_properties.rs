//! Property tests for the warranty workflow over generated inputs

use std::collections::BTreeMap;

use proptest::prelude::*;
use rust_decimal::Decimal;

use core_kernel::{Currency, Money, PartId, PartNumber, Vin, WarehouseId};
use domain_warranty::{
    CampaignMatch, ClaimIdentity, ClaimQuery, CreateClaimRequest, FinalizeOutcome, FinalizePath,
    FinalizeRequest, InventoryPort, LedgerCommand, NewPartCheck, PartApprovalLedger,
    PartCatalogEntry, PartsCatalog, Vehicle,
};
use test_utils::{
    campaign_window_strategy, claim_identity_strategy, fake_description, fake_owner_name, fake_vin,
    ledger_command_strategy, part_checks_strategy, vin_strategy, vnd_price_strategy,
    CampaignDraftBuilder, MockWorld, TemporalFixtures, VehicleFixtures, CENTER, CREATOR, EVM,
    OTHER_WAREHOUSE, TECHNICIAN,
};

const GENERATED_STOCK: i64 = 100;

fn home_warehouse(id: PartId) -> WarehouseId {
    if id.get() % 2 == 0 {
        WarehouseId::new(CENTER.get())
    } else {
        OTHER_WAREHOUSE
    }
}

fn request(vin: Vin) -> CreateClaimRequest {
    CreateClaimRequest {
        center_id: CENTER,
        vin,
        created_by: CREATOR,
        assigned_technician: Some(TECHNICIAN),
        description: fake_description(),
        confirm_campaign: false,
        campaign_id: None,
    }
}

/// Seeds a catalog entry and stock for every generated part number
async fn seed_generated_parts(world: &MockWorld, checks: &[NewPartCheck]) {
    let entries: Vec<PartCatalogEntry> = checks
        .iter()
        .map(|c| PartCatalogEntry {
            part_id: c.part_id,
            part_number: c.part_number.clone(),
            name: format!("Generated {}", c.part_number),
            unit_price: Money::new(Decimal::from(1000), Currency::VND),
            home_warehouse_id: home_warehouse(c.part_id),
        })
        .collect();
    for entry in &entries {
        world
            .store
            .seed_stock(entry.home_warehouse_id, entry.part_number.clone(), GENERATED_STOCK)
            .await;
    }
    world.store.seed_catalog(entries).await;
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

fn checks_with_commands() -> impl Strategy<Value = (Vec<NewPartCheck>, Vec<LedgerCommand>)> {
    part_checks_strategy(6).prop_flat_map(|checks| {
        let len = checks.iter().filter(|c| c.is_repair).count();
        (Just(checks), prop::collection::vec(ledger_command_strategy(len), 0..10))
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn finalize_debits_only_approved_home_quantities((checks, commands) in checks_with_commands()) {
        prop_assume!(checks.iter().any(|c| c.is_repair));

        runtime().block_on(async {
            let world = MockWorld::new().await;
            seed_generated_parts(&world, &checks).await;
            let workflow = &world.workflow;

            let created = workflow
                .create_claim(request(VehicleFixtures::vf5()), None)
                .await
                .unwrap();
            let id = created.claim.id;
            workflow.record_technician_check(id, checks.clone(), None).await.unwrap();
            workflow.request_decision(id, None).await.unwrap();

            let recorded = workflow.part_checks(id).await.unwrap();
            let mut ledger = PartApprovalLedger::from_part_checks(id, &recorded);
            let mut commands = commands.clone();
            let commands_valid = ledger.apply_all(&commands).is_ok();

            if commands_valid {
                for index in ledger.unreviewed() {
                    let settle = LedgerCommand::SetRejection { index, value: true };
                    ledger.apply(settle).unwrap();
                    commands.push(settle);
                }
            }

            let result = workflow
                .finalize(
                    id,
                    FinalizeRequest {
                        evm_id: Some(EVM),
                        description: "Reviewed".to_string(),
                        commands,
                    },
                    None,
                )
                .await;

            let mut debited: BTreeMap<PartNumber, i64> = BTreeMap::new();
            for check in &checks {
                let level = world
                    .store
                    .stock_level(home_warehouse(check.part_id), &check.part_number)
                    .await
                    .unwrap();
                if level != GENERATED_STOCK {
                    debited.insert(check.part_number.clone(), GENERATED_STOCK - level);
                }
            }

            if !commands_valid {
                assert!(result.is_err());
                assert!(debited.is_empty());
                return;
            }

            let expected: BTreeMap<PartNumber, i64> = ledger
                .approved_quantities()
                .into_iter()
                .filter(|(number, _)| {
                    checks.iter().any(|c| {
                        &c.part_number == number && home_warehouse(c.part_id).belongs_to(CENTER)
                    })
                })
                .map(|(number, quantity)| (number, i64::from(quantity)))
                .collect();

            match result.unwrap() {
                FinalizeOutcome::Completed(report) => match report.path {
                    FinalizePath::Reconciled { plan } => {
                        assert!(plan.debits.iter().all(|d| d.warehouse_id.belongs_to(CENTER)));
                    }
                    FinalizePath::DecisionHandover => assert!(expected.is_empty()),
                },
                other => panic!("expected a completed finalize, got {:?}", other),
            }
            assert_eq!(debited, expected);
        });
    }

    #[test]
    fn approved_cost_is_price_times_quantity(
        checks in part_checks_strategy(6),
        prices in prop::collection::vec(vnd_price_strategy(), 6),
    ) {
        let id: ClaimIdentity = "WC-5-2025-10-10-001".parse().unwrap();
        let entries: Vec<PartCatalogEntry> = checks
            .iter()
            .zip(prices.iter())
            .map(|(c, price)| PartCatalogEntry {
                part_id: c.part_id,
                part_number: c.part_number.clone(),
                name: c.part_number.to_string(),
                unit_price: price.clone(),
                home_warehouse_id: home_warehouse(c.part_id),
            })
            .collect();
        let expected: Decimal = checks
            .iter()
            .zip(prices.iter())
            .filter(|(c, _)| c.is_repair)
            .map(|(c, price)| price.amount() * Decimal::from(c.quantity))
            .sum();

        let catalog = PartsCatalog::from_entries(entries, Currency::VND);
        let records: Vec<_> = checks.iter().cloned().map(|c| c.into_check(id)).collect();
        let mut ledger = PartApprovalLedger::from_part_checks(id, &records);
        ledger.bulk_approve(true);

        let total = ledger.total_approved_cost(&catalog).unwrap();
        prop_assert_eq!(total.amount().normalize(), expected.normalize());
        prop_assert_eq!(total.currency(), Currency::VND);
    }

    #[test]
    fn short_campaign_window_clears_end_date((start, end, days) in campaign_window_strategy()) {
        let mut draft = CampaignDraftBuilder::new().window(start, end).build();

        let result = draft.validate(start);

        if days < 5 {
            let errors = result.unwrap_err();
            prop_assert!(errors.contains("end_date"));
            prop_assert!(!errors.contains("start_date"));
            prop_assert_eq!(draft.end_date, None);
        } else {
            prop_assert!(result.is_ok());
            prop_assert_eq!(draft.end_date, Some(end));
        }
    }

    #[test]
    fn claim_ids_parse_back_to_themselves(id in claim_identity_strategy()) {
        let parsed: ClaimIdentity = id.to_string().parse().unwrap();
        prop_assert_eq!(parsed, id);
        prop_assert!(parsed.has_prefix(id.center_id(), id.date()));
    }

    #[test]
    fn unknown_vehicles_open_no_claim(vin in vin_strategy()) {
        runtime().block_on(async {
            let world = MockWorld::new().await;

            let result = world.workflow.create_claim(request(vin), None).await;

            assert!(result.is_err());
            let claims = world.workflow.list_claims(ClaimQuery::by_center(CENTER)).await.unwrap();
            assert!(claims.is_empty());
        });
    }
}

#[tokio::test]
async fn test_generated_vehicle_matches_its_model_campaign() {
    let world = MockWorld::new().await;
    let vin = fake_vin();
    world
        .store
        .seed_vehicle(Vehicle::new(vin.clone(), "VF8").with_owner(fake_owner_name()))
        .await;

    let created = world.workflow.create_claim(request(vin.clone()), None).await.unwrap();

    assert_eq!(created.claim.vin, vin);
    assert!(!created.claim.description.is_empty());
    assert_eq!(created.claim.id.date(), TemporalFixtures::today());
    match created.campaign_match {
        CampaignMatch::Single(campaign) => assert_eq!(campaign.id.get(), 1),
        other => panic!("expected the VF8 campaign, got {:?}", other),
    }
}

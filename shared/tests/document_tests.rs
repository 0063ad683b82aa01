//! Plan document serialization tests

use nmp_shared::store::{Action, MemoryStorage, Store};
use nmp_shared::{
    AnimalCommon, Animal, BalanceValues, BeefCattle, BookLab, Crop, FarmDetails, Field,
    ManureData, ManureInSystem, ManureStorageSystem, ManureType, NmpFile, NmpFileYear, SoilTest,
    StorageShape,
};
use proptest::prelude::*;

/// Quarters keep every value exactly representable
fn quarter() -> impl Strategy<Value = f64> {
    (0u32..4000).prop_map(|k| f64::from(k) / 4.0)
}

fn field_strategy() -> impl Strategy<Value = Field> {
    ("[A-Za-z][A-Za-z ]{0,20}", quarter(), quarter(), quarter(), 0u32..4).prop_map(
        |(name, area, req_n, ph, frequency)| {
            let mut field = Field::new(name, area + 0.25);
            field.previous_year_manure_application_frequency = frequency;
            field.soil_test = Some(SoilTest {
                soil_test_id: 2,
                val_ph: Some(ph),
                val_p: Some(req_n),
                ..Default::default()
            });
            field.crops.push(Crop {
                name: "Corn".to_string(),
                crop_id: 1,
                crop_type_id: 2,
                balance: BalanceValues {
                    req_n,
                    ..Default::default()
                },
                ..Default::default()
            });
            field
        },
    )
}

fn animal_strategy() -> impl Strategy<Value = Animal> {
    (1u32..500, quarter()).prop_map(|(count, tons)| {
        Animal::BeefCattle(BeefCattle {
            common: AnimalCommon {
                subtype: Some("3".to_string()),
                animals_per_farm: Some(count),
                manure_data: Some(ManureData {
                    name: "Cows".to_string(),
                    annual_solid_manure: Some(tons),
                    annual_liquid_manure: None,
                }),
                ..AnimalCommon::new()
            },
        })
    })
}

fn file_strategy() -> impl Strategy<Value = NmpFile> {
    (
        prop::collection::vec(field_strategy(), 0..4),
        prop::collection::vec(animal_strategy(), 0..3),
        "[a-z]{0,12}",
    )
        .prop_map(|(fields, animals, farm_name)| {
            let mut year = NmpFileYear::new("2025");
            year.fields = fields;
            year.farm_animals = animals;
            NmpFile {
                farm_details: FarmDetails {
                    year: "2025".to_string(),
                    farm_name,
                    ..Default::default()
                },
                years: vec![year],
                unsaved: false,
                nmp_release_version: 2,
            }
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// JSON round trip preserves the document
    #[test]
    fn property_document_round_trip(file in file_strategy()) {
        let json = serde_json::to_string(&file).unwrap();
        let parsed: NmpFile = serde_json::from_str(&json).unwrap();
        prop_assert_eq!(parsed, file);
    }

    /// Exporting from one store and importing into another yields the same plan
    #[test]
    fn property_export_import(file in file_strategy()) {
        let mut store = Store::load(MemoryStorage::new());
        store.dispatch(Action::OverwriteNmpFile { new_file: Box::new(file) }).unwrap();

        let mut other = Store::load(MemoryStorage::new());
        other.import_nmp(&store.export_nmp().unwrap()).unwrap();
        prop_assert_eq!(&other.state().nmp_file, &store.state().nmp_file);
    }
}

#[test]
fn test_animal_tag_survives_round_trip() {
    let json = r#"{"animalId":"6","uuid":"0b7d6a3c-1d8f-4c4e-9f3a-5a2b1c0d9e8f","flocksPerYear":3}"#;
    let animal: Animal = serde_json::from_str(json).unwrap();
    assert!(matches!(animal, Animal::Poultry(_)));
    assert_eq!(animal.group_label(), "3 flocks");

    let back = serde_json::to_value(&animal).unwrap();
    assert_eq!(back["animalId"], "6");
}

// ============================================================================
// Files saved by the browser app
// ============================================================================

/// A plan as the browser app writes it: numeric manure and shape codes, text
/// moisture, month-only sample dates and leftover keys from older releases
const BROWSER_PLAN: &str = r#"{
  "farmDetails": {
    "year": "2025",
    "farmName": "Hillside",
    "farmRegion": 3,
    "hasAnimals": true,
    "hasBeefCows": true,
    "farmAnimals": ["1"],
    "userJourney": 2
  },
  "unsaved": false,
  "nmpReleaseVersion": 2,
  "years": [
    {
      "Year": "",
      "Fields": [],
      "FarmAnimals": [],
      "SeparatedSolidManures": [],
      "year": "2025",
      "fields": [
        {
          "fieldName": "North",
          "area": 12.5,
          "previousYearManureApplicationId": 2,
          "comment": "",
          "crops": [
            {"cropId": 28, "cropTypeId": 4, "yield": 2.9, "crudeProtein": 2.29375,
             "nCredit": 0, "reqN": 36, "remN": 21}
          ],
          "soilTest": {"soilTestId": 2, "valP": 30, "valK": 35, "valPH": 6.5,
                       "convertedKelownaP": 32.56, "convertedKelownaK": 35.2,
                       "sampleDate": "2024-03"},
          "manures": [
            {"manureId": 7, "manureName": "Beef cattle", "applicationId": 1,
             "applUnitId": 1, "applicationRate": 10, "nh4Retention": 50,
             "nh4RetentionAdjusted": false, "nAvailable": 30,
             "nAvailableAdjusted": false, "solidLiquid": "",
             "sourceUuid": "5f0e1a2b-3c4d-4e5f-8a9b-0c1d2e3f4a5b",
             "reqN": 34, "remN": 18}
          ],
          "fertilizers": [
            {"fertilizerTypeId": 1, "fertilizerId": 3, "applicationRate": 100,
             "applUnitId": 1, "applDate": "2025-04-01T07:00:00.000Z",
             "applicationMethod": "Broadcast"}
          ],
          "fertigations": [],
          "otherNutrients": []
        }
      ],
      "farmAnimals": [
        {
          "animalId": "1",
          "subtype": "3",
          "animalsPerFarm": 20,
          "manureType": 2,
          "daysCollected": 365,
          "manureData": {"name": "Beef cows", "annualSolidManure": 146},
          "uuid": "5f0e1a2b-3c4d-4e5f-8a9b-0c1d2e3f4a5b"
        }
      ],
      "generatedManures": [
        {
          "uniqueMaterialName": "Beef cows",
          "manureType": 2,
          "annualAmount": 146,
          "annualAmountTonsWeight": 146,
          "annualAmountDisplayWeight": "146 tons",
          "managedManureName": "Beef cows, 20 animals, Solid",
          "assignedToStoredSystem": true,
          "uuid": "5f0e1a2b-3c4d-4e5f-8a9b-0c1d2e3f4a5b"
        }
      ],
      "importedManures": [],
      "derivedManures": [],
      "manureStorageSystems": [
        {
          "name": "Lagoon",
          "manureType": 1,
          "manuresInSystem": [],
          "getsRunoff": false,
          "runoffAreaSqFt": 0,
          "hasSeperation": false,
          "percentLiquidSeperation": 0,
          "separatedLiquidsUSGallons": 0,
          "separatedSolidsTons": 0,
          "manureStorages": [
            {"name": "Pit", "manureType": 1, "isStructureCovered": false,
             "uncoveredAreaSqFt": 100, "volumeUSGallons": 7481,
             "structure": {"shape": 1, "lengthFt": 10, "widthFt": 10, "heightFt": 10}}
          ],
          "uuid": "0b7d6a3c-1d8f-4c4e-9f3a-5a2b1c0d9e8f"
        },
        {
          "name": "Pile",
          "manureType": 2,
          "manuresInSystem": [
            {"type": "Generated", "data": {
              "uniqueMaterialName": "Beef cows",
              "manureType": 2,
              "annualAmount": 146,
              "managedManureName": "Beef cows, 20 animals, Solid",
              "uuid": "5f0e1a2b-3c4d-4e5f-8a9b-0c1d2e3f4a5b"
            }}
          ],
          "manureStorage": {"name": "Pad", "manureType": 2, "isStructureCovered": true},
          "uuid": "7c6b5a49-3827-4615-a4b3-c2d1e0f9a8b7"
        }
      ],
      "nutrientAnalyses": [
        {
          "N": 0.5, "P": 0.1, "K": 0.4, "NH4N": 1000,
          "manureId": 7,
          "solidLiquid": "Solid",
          "Moisture": "75",
          "sourceUuid": "7c6b5a49-3827-4615-a4b3-c2d1e0f9a8b7",
          "sourceName": "Pile",
          "bookLab": "book",
          "UniqueMaterialName": "Beef cows",
          "manureName": "Beef cattle",
          "annualAmount": 146
        }
      ]
    }
  ]
}"#;

#[test]
fn test_browser_plan_imports() {
    let mut store = Store::load(MemoryStorage::new());
    store.import_nmp(BROWSER_PLAN).unwrap();
    let file = &store.state().nmp_file;
    let year = file.year("2025").unwrap();

    let field = &year.fields[0];
    assert_eq!(field.previous_year_manure_application_frequency, 2);
    assert_eq!(field.manures[0].solid_liquid, None);
    assert_eq!(field.fertilizers[0].appl_date.as_deref(), Some("2025-04-01T07:00:00.000Z"));
    let soil = field.soil_test.as_ref().unwrap();
    assert_eq!(soil.sample_month().map(|d| d.to_string()).as_deref(), Some("2024-03-01"));

    let animal = &year.farm_animals[0];
    assert!(matches!(animal, Animal::BeefCattle(_)));
    assert_eq!(animal.common().manure_type, Some(ManureType::Solid));
    assert_eq!(
        animal.common().manure_data.as_ref().and_then(|d| d.annual_solid_manure),
        Some(146.0)
    );

    let generated = &year.generated_manures[0];
    assert_eq!(generated.index, 0);
    assert_eq!(generated.manure_type, ManureType::Solid);

    match &year.manure_storage_systems[0] {
        ManureStorageSystem::Liquid(lagoon) => assert_eq!(
            lagoon.manure_storages[0].structure,
            Some(StorageShape::Rectangular {
                length_ft: 10.0,
                width_ft: 10.0,
                height_ft: 10.0,
            })
        ),
        other => panic!("expected the lagoon to be liquid, got {:?}", other),
    }
    let pile = &year.manure_storage_systems[1];
    assert_eq!(pile.manure_type(), ManureType::Solid);
    assert!(matches!(pile.manures_in_system()[0], ManureInSystem::Generated(_)));

    let analysis = &year.nutrient_analyses[0];
    assert_eq!(analysis.moisture, Some(75.0));
    assert_eq!(analysis.solid_liquid, Some(ManureType::Solid));
    assert_eq!(analysis.book_lab, BookLab::Book);
    assert_eq!(analysis.unique_material_name, "Beef cows");
}

#[test]
fn test_browser_plan_exports_in_the_same_shape() {
    let mut store = Store::load(MemoryStorage::new());
    store.import_nmp(BROWSER_PLAN).unwrap();
    let exported: serde_json::Value = serde_json::from_str(&store.export_nmp().unwrap()).unwrap();
    let year = &exported["years"][0];

    assert_eq!(year["fields"][0]["previousYearManureApplicationId"], 2);
    assert_eq!(year["fields"][0]["manures"][0]["solidLiquid"], "");
    assert_eq!(year["farmAnimals"][0]["manureType"], 2);
    assert_eq!(year["generatedManures"][0]["manureType"], 2);
    assert_eq!(year["manureStorageSystems"][0]["manureType"], 1);
    assert_eq!(year["manureStorageSystems"][0]["manureStorages"][0]["manureType"], 1);
    assert_eq!(year["manureStorageSystems"][0]["manureStorages"][0]["structure"]["shape"], 1);
    assert_eq!(year["manureStorageSystems"][1]["manureStorage"]["manureType"], 2);
    assert_eq!(year["nutrientAnalyses"][0]["UniqueMaterialName"], "Beef cows");

    // Leftover keys from older releases are not carried forward
    assert!(year.get("Fields").is_none());
}

#[test]
fn test_browser_plan_regenerates_manure_from_animals() {
    let mut store = Store::load(MemoryStorage::new());
    store.import_nmp(BROWSER_PLAN).unwrap();
    let animals = store.state().nmp_file.years[0].farm_animals.clone();

    store
        .dispatch(Action::SaveAnimals {
            year: "2025".to_string(),
            new_animals: animals,
        })
        .unwrap();

    let manure = &store.state().nmp_file.years[0].generated_manures[0];
    assert_eq!(manure.manure_type, ManureType::Solid);
    assert_eq!(manure.annual_amount, 146.0);
    assert_eq!(manure.managed_manure_name, "Beef cows, 20 animals, Solid");
}

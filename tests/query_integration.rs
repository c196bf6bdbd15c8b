//! End-to-end queries against a synthetic catalog written through the
//! population builder into a temporary directory.

use std::path::Path;
use tempfile::TempDir;
use veriset::catalog::CatalogBuilder;
use veriset::query::{ClientQuery, Database, NormQuery, ObjectQuery};
use veriset::types::{ClientGroup, Gender, Language, Purpose, PurposeGroup};
use veriset::vocab::{Ids, Terms};
use veriset::QueryError;

/// Build the shared benchmark fixture.
///
/// Clients: 1,2 in g1 (m/f), 3,4 in g2 (m/f), 5,6,7 in world with
/// subworlds onethird = {5} and twothirds = {6,7}.
///
/// Protocol "P" carries the full bucket set; protocol "G" only a world
/// bucket. File 2 is attached to both the P world and the P dev/enrol
/// buckets to exercise cross-branch deduplication. Files 6 and 8 are
/// impostor probes (claimed id differs from the owning client).
fn fixture() -> (TempDir, Database) {
    let temp_dir = TempDir::new().unwrap();
    let location = temp_dir.path().join("benchmark.catalog");

    let mut b = CatalogBuilder::new();
    b.add_client(1, Gender::M, ClientGroup::G1, Language::En).unwrap();
    b.add_client(2, Gender::F, ClientGroup::G1, Language::En).unwrap();
    b.add_client(3, Gender::M, ClientGroup::G2, Language::En).unwrap();
    b.add_client(4, Gender::F, ClientGroup::G2, Language::En).unwrap();
    b.add_client(5, Gender::M, ClientGroup::World, Language::En).unwrap();
    b.add_client(6, Gender::F, ClientGroup::World, Language::En).unwrap();
    b.add_client(7, Gender::M, ClientGroup::World, Language::En).unwrap();

    let onethird = b.add_subworld("onethird").unwrap();
    let twothirds = b.add_subworld("twothirds").unwrap();
    b.add_subworld_member(onethird, 5).unwrap();
    b.add_subworld_member(twothirds, 6).unwrap();
    b.add_subworld_member(twothirds, 7).unwrap();

    let p = b.add_protocol("P").unwrap();
    let g = b.add_protocol("G").unwrap();
    let p_world = b.add_protocol_purpose(p, PurposeGroup::World, Purpose::Train).unwrap();
    let p_dev_enrol = b.add_protocol_purpose(p, PurposeGroup::Dev, Purpose::Enrol).unwrap();
    let p_dev_probe = b.add_protocol_purpose(p, PurposeGroup::Dev, Purpose::Probe).unwrap();
    let p_eval_enrol = b.add_protocol_purpose(p, PurposeGroup::Eval, Purpose::Enrol).unwrap();
    let p_eval_probe = b.add_protocol_purpose(p, PurposeGroup::Eval, Purpose::Probe).unwrap();
    let g_world = b.add_protocol_purpose(g, PurposeGroup::World, Purpose::Train).unwrap();

    // id, owner, path, claimed, shot, session
    b.add_file(1, 5, "s05/w1", 5, 1, 1).unwrap();
    b.add_file(2, 6, "s06/w1", 6, 1, 1).unwrap();
    b.add_file(3, 7, "s07/w1", 7, 1, 2).unwrap();
    b.add_file(4, 1, "s01/e1", 1, 1, 1).unwrap();
    b.add_file(5, 1, "s01/p1", 1, 1, 2).unwrap();
    b.add_file(6, 2, "s02/p1", 1, 1, 2).unwrap(); // impostor claiming client 1
    b.add_file(7, 3, "s03/e1", 3, 1, 1).unwrap();
    b.add_file(8, 4, "s04/p1", 3, 1, 2).unwrap(); // impostor claiming client 3
    b.add_file(9, 3, "s03/p1", 3, 1, 2).unwrap();

    b.add_purpose_file(p_world, 1).unwrap();
    b.add_purpose_file(p_world, 2).unwrap();
    b.add_purpose_file(g_world, 3).unwrap();
    b.add_purpose_file(p_dev_enrol, 4).unwrap();
    b.add_purpose_file(p_dev_enrol, 2).unwrap(); // also a world file, see above
    b.add_purpose_file(p_dev_probe, 5).unwrap();
    b.add_purpose_file(p_dev_probe, 6).unwrap();
    b.add_purpose_file(p_eval_enrol, 7).unwrap();
    b.add_purpose_file(p_eval_probe, 8).unwrap();
    b.add_purpose_file(p_eval_probe, 9).unwrap();

    b.write(&location).unwrap();
    (temp_dir, Database::open(location).unwrap())
}

fn client_ids(clients: &[veriset::catalog::Client]) -> Vec<i64> {
    clients.iter().map(|c| c.id).collect()
}

fn file_ids(files: &[veriset::catalog::File]) -> Vec<i64> {
    files.iter().map(|f| f.id).collect()
}

#[test]
fn no_filter_means_all_clients_world_first() {
    let (_tmp, db) = fixture();
    let all = db.clients(ClientQuery::default()).unwrap();
    assert_eq!(client_ids(&all), vec![5, 6, 7, 1, 2, 3, 4]);
}

#[test]
fn absent_filters_equal_full_enumeration() {
    let (_tmp, db) = fixture();
    let absent = db.clients(ClientQuery::default()).unwrap();
    let explicit = db
        .clients(ClientQuery {
            groups: Terms::from(["world", "g1", "g2"]),
            gender: Terms::from(["m", "f"]),
            language: Terms::from("en"),
            ..ClientQuery::default()
        })
        .unwrap();
    assert_eq!(absent, explicit);
}

#[test]
fn dev_alias_equals_g1() {
    let (_tmp, db) = fixture();
    let dev = db
        .clients(ClientQuery {
            groups: Terms::from("dev"),
            ..ClientQuery::default()
        })
        .unwrap();
    let g1 = db
        .clients(ClientQuery {
            groups: Terms::from("g1"),
            ..ClientQuery::default()
        })
        .unwrap();
    assert_eq!(dev, g1);
    assert_eq!(client_ids(&dev), vec![1, 2]);
}

#[test]
fn gender_filter_and_invalid_value() {
    let (_tmp, db) = fixture();
    let women = db
        .clients(ClientQuery {
            gender: Terms::from("f"),
            ..ClientQuery::default()
        })
        .unwrap();
    assert_eq!(client_ids(&women), vec![6, 2, 4]);

    let err = db
        .clients(ClientQuery {
            gender: Terms::from("x"),
            ..ClientQuery::default()
        })
        .unwrap_err();
    match err {
        QueryError::InvalidArgument { field, value, valid } => {
            assert_eq!(field, "gender");
            assert_eq!(value, "x");
            assert_eq!(valid, vec!["m", "f"]);
        }
        other => panic!("expected InvalidArgument, got {other:?}"),
    }
}

#[test]
fn single_subworld_restricts_world_branch() {
    let (_tmp, db) = fixture();
    let onethird = db
        .clients(ClientQuery {
            groups: Terms::from("world"),
            subworld: Terms::from("onethird"),
            ..ClientQuery::default()
        })
        .unwrap();
    assert_eq!(client_ids(&onethird), vec![5]);

    // Two requested splits mean the restriction does not apply
    let both = db
        .clients(ClientQuery {
            groups: Terms::from("world"),
            subworld: Terms::from(["onethird", "twothirds"]),
            ..ClientQuery::default()
        })
        .unwrap();
    assert_eq!(client_ids(&both), vec![5, 6, 7]);
}

#[test]
fn tnorm_cohort_swaps_groups() {
    let (_tmp, db) = fixture();
    let t_g1 = db.tclients("g1").unwrap();
    let g2 = db
        .clients(ClientQuery {
            groups: Terms::from("g2"),
            ..ClientQuery::default()
        })
        .unwrap();
    assert_eq!(t_g1, g2);

    let t_g2 = db.tclients("g2").unwrap();
    assert_eq!(client_ids(&t_g2), vec![1, 2]);

    // Double swap over the full pair restores the full pair
    let once = db.tclients(["g1", "g2"]).unwrap();
    let twice = db.tclients(["g2", "g1"]).unwrap();
    assert_eq!(client_ids(&once), client_ids(&twice));
    assert_eq!(client_ids(&once), vec![1, 2, 3, 4]);

    // Aliases resolve before the swap
    assert_eq!(db.tclients("dev").unwrap(), g2);

    // world is not a valid norm cohort group
    assert!(matches!(
        db.tclients("world").unwrap_err(),
        QueryError::InvalidArgument { field: "group", .. }
    ));
}

#[test]
fn znorm_cohort_matches_tnorm() {
    let (_tmp, db) = fixture();
    assert_eq!(db.zclients("g1").unwrap(), db.tclients("g1").unwrap());
    assert_eq!(
        client_ids(&db.zclients(None::<&str>).unwrap()),
        vec![1, 2, 3, 4]
    );
}

#[test]
fn models_are_clients() {
    let (_tmp, db) = fixture();
    assert_eq!(
        db.models(ClientQuery::default()).unwrap(),
        db.clients(ClientQuery::default()).unwrap()
    );
    assert_eq!(db.tmodels("g1").unwrap(), db.tclients("g1").unwrap());
    assert_eq!(db.get_client_id_from_model_id(42), 42);
    assert_eq!(db.get_client_id_from_tmodel_id(17), 17);
}

#[test]
fn objects_unfiltered_covers_every_branch_once() {
    let (_tmp, db) = fixture();
    let all = db.objects(ObjectQuery::default()).unwrap();
    let mut ids = file_ids(&all);
    assert_eq!(ids.len(), 9, "every file exactly once");
    ids.sort_unstable();
    assert_eq!(ids, vec![1, 2, 3, 4, 5, 6, 7, 8, 9]);
}

#[test]
fn world_branch_orders_by_client_session_claimed_shot() {
    let (_tmp, db) = fixture();
    let world = db
        .objects(ObjectQuery {
            groups: Terms::from("world"),
            ..ObjectQuery::default()
        })
        .unwrap();
    // Files 1 (owner 5), 2 (owner 6), 3 (owner 7) across protocols P and G
    assert_eq!(file_ids(&world), vec![1, 2, 3]);
}

#[test]
fn world_branch_respects_protocol_and_subworld() {
    let (_tmp, db) = fixture();
    let g_only = db
        .objects(ObjectQuery {
            protocol: Terms::from("G"),
            groups: Terms::from("world"),
            ..ObjectQuery::default()
        })
        .unwrap();
    assert_eq!(file_ids(&g_only), vec![3]);

    let twothirds = db
        .objects(ObjectQuery {
            groups: Terms::from("world"),
            subworld: Terms::from("twothirds"),
            ..ObjectQuery::default()
        })
        .unwrap();
    assert_eq!(file_ids(&twothirds), vec![2, 3]);
}

#[test]
fn enrol_branch_selects_enrolment_files() {
    let (_tmp, db) = fixture();
    let enrol = db
        .objects(ObjectQuery {
            purposes: Terms::from("enrol"),
            groups: Terms::from("dev"),
            ..ObjectQuery::default()
        })
        .unwrap();
    // File 2 (owner 6) is in the dev/enrol bucket too; branch order is by
    // owning client id
    assert_eq!(file_ids(&enrol), vec![4, 2]);

    let enrol_for_model = db
        .objects(ObjectQuery {
            purposes: Terms::from("enrol"),
            groups: Terms::from("dev"),
            model_ids: Ids::from(1),
            ..ObjectQuery::default()
        })
        .unwrap();
    assert_eq!(file_ids(&enrol_for_model), vec![4]);
}

#[test]
fn impostor_branch_matches_claimed_identity() {
    let (_tmp, db) = fixture();
    // File 6: owner 2, claimed 1. Asking for impostor probes of model 1
    // must include it; asking for model 2 must not.
    let claiming_one = db
        .objects(ObjectQuery {
            purposes: Terms::from("probe"),
            classes: Terms::from("impostor"),
            groups: Terms::from("dev"),
            model_ids: Ids::from(1),
            ..ObjectQuery::default()
        })
        .unwrap();
    assert_eq!(file_ids(&claiming_one), vec![6]);

    let owned_by_two = db
        .objects(ObjectQuery {
            purposes: Terms::from("probe"),
            classes: Terms::from("impostor"),
            groups: Terms::from("dev"),
            model_ids: Ids::from(2),
            ..ObjectQuery::default()
        })
        .unwrap();
    assert!(owned_by_two.is_empty());
}

#[test]
fn client_class_matches_owning_identity() {
    let (_tmp, db) = fixture();
    let genuine = db
        .objects(ObjectQuery {
            purposes: Terms::from("probe"),
            classes: Terms::from("client"),
            groups: Terms::from("dev"),
            model_ids: Ids::from(1),
            ..ObjectQuery::default()
        })
        .unwrap();
    assert_eq!(file_ids(&genuine), vec![5]);
}

#[test]
fn duplicate_across_branches_returned_once() {
    let (_tmp, db) = fixture();
    // File 2 sits in both the P world bucket and the P dev/enrol bucket
    let merged = db
        .objects(ObjectQuery {
            protocol: Terms::from("P"),
            groups: Terms::from(["world", "dev"]),
            ..ObjectQuery::default()
        })
        .unwrap();
    let ids = file_ids(&merged);
    assert_eq!(ids.iter().filter(|&&id| id == 2).count(), 1);
    // World branch comes first, so file 2 appears at its world position
    assert_eq!(ids, vec![1, 2, 4, 5, 6]);
}

#[test]
fn tobjects_swaps_dev_and_eval() {
    let (_tmp, db) = fixture();
    let t_dev = db
        .tobjects(NormQuery {
            groups: Terms::from("dev"),
            ..NormQuery::default()
        })
        .unwrap();
    // dev swaps to eval, enrol purpose only
    assert_eq!(file_ids(&t_dev), vec![7]);

    assert!(matches!(
        db.tobjects(NormQuery {
            groups: Terms::from("world"),
            ..NormQuery::default()
        })
        .unwrap_err(),
        QueryError::InvalidArgument { field: "group", .. }
    ));
}

#[test]
fn zobjects_selects_opposite_probes_of_all_classes() {
    let (_tmp, db) = fixture();
    let z_dev = db
        .zobjects(NormQuery {
            groups: Terms::from("dev"),
            ..NormQuery::default()
        })
        .unwrap();
    // dev swaps to eval; probe bucket holds genuine file 9 and impostor
    // file 8, ordered by owning client id
    assert_eq!(file_ids(&z_dev), vec![9, 8]);
}

#[test]
fn paths_preserve_order_and_duplicates() {
    let (_tmp, db) = fixture();
    let paths = db
        .paths(&[4, 4, 999, 5], Some(Path::new("/data")), Some(".hdf5"))
        .unwrap();
    assert_eq!(
        paths,
        vec![
            std::path::PathBuf::from("/data/s01/e1.hdf5"),
            std::path::PathBuf::from("/data/s01/e1.hdf5"),
            std::path::PathBuf::from("/data/s01/p1.hdf5"),
        ]
    );
}

#[test]
fn reverse_recovers_file_ids_from_bare_stems() {
    let (_tmp, db) = fixture();
    let stems = db.paths(&[4, 5], None, None).unwrap();
    let stems: Vec<String> = stems
        .iter()
        .map(|p| p.to_string_lossy().into_owned())
        .collect();
    assert_eq!(db.reverse(&stems).unwrap(), vec![4, 5]);

    // Unknown stems are silently skipped
    assert_eq!(db.reverse(&["nope/missing"]).unwrap(), Vec::<i64>::new());
}

#[test]
fn protocol_and_subworld_accessors() {
    let (_tmp, db) = fixture();
    assert_eq!(db.protocol_names().unwrap(), vec!["P", "G"]);
    assert!(db.has_protocol("P").unwrap());
    assert!(!db.has_protocol("Mc").unwrap());
    assert_eq!(db.protocol("G").unwrap().name, "G");
    assert!(matches!(
        db.protocol("Ud").unwrap_err(),
        QueryError::Lookup { entity: "protocol", matches: 0, .. }
    ));
    assert_eq!(db.protocol_purposes().unwrap().len(), 6);

    assert_eq!(db.subworld_names().unwrap(), vec!["onethird", "twothirds"]);
    assert!(db.has_subworld("twothirds").unwrap());
    assert!(!db.has_subworld("half").unwrap());

    assert!(db.has_client_id(3).unwrap());
    assert!(!db.has_client_id(99).unwrap());
    assert_eq!(db.client(3).unwrap().gender.as_str(), "m");
    assert!(matches!(
        db.client(99).unwrap_err(),
        QueryError::Lookup { entity: "client", matches: 0, .. }
    ));
}

#[test]
fn invalid_protocol_rejected_against_data_driven_set() {
    let (_tmp, db) = fixture();
    let err = db
        .objects(ObjectQuery {
            protocol: Terms::from("Mc"),
            ..ObjectQuery::default()
        })
        .unwrap_err();
    match err {
        QueryError::InvalidArgument { field, value, valid } => {
            assert_eq!(field, "protocol");
            assert_eq!(value, "Mc");
            assert_eq!(valid, vec!["P", "G"]);
        }
        other => panic!("expected InvalidArgument, got {other:?}"),
    }
}

#[test]
fn missing_catalog_reports_not_found_on_use() {
    let temp_dir = TempDir::new().unwrap();
    let location = temp_dir.path().join("never-populated.catalog");
    let db = Database::open(&location).unwrap();
    assert!(!db.is_valid());

    match db.clients(ClientQuery::default()).unwrap_err() {
        QueryError::NotFound { location: loc } => assert_eq!(loc, location),
        other => panic!("expected NotFound, got {other:?}"),
    }
    assert!(db.objects(ObjectQuery::default()).is_err());
    assert!(db.subworld_names().is_err());
}

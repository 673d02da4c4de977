use pretty_assertions::assert_eq;
use synthbox_ports::{
    CatalogError, InMemoryCatalog, Parameter, SynthCatalog, SynthDefinition, SynthId,
};

fn synth(id: u32, ccs: &[u8]) -> SynthDefinition {
    SynthDefinition {
        id: SynthId(id),
        slug: format!("synth_{}", id),
        manufacturer: "Acme".to_string(),
        title: format!("Model {}", id),
        subtitle: None,
        parameters: ccs
            .iter()
            .map(|cc| Parameter {
                cc: *cc,
                title: format!("Param {}", cc),
            })
            .collect(),
    }
}

#[test]
fn lookup_by_id_returns_definition() {
    let catalog = InMemoryCatalog::new(vec![synth(2, &[10]), synth(1, &[1, 2])]).unwrap();

    let found = catalog.get_by_id(SynthId(1)).unwrap();
    assert_eq!(found.parameters.len(), 2);
    assert_eq!(found.display_title(), "Acme Model 1");
    let ids: Vec<_> = catalog.synths().iter().map(|s| s.id.0).collect();
    assert_eq!(ids, vec![1, 2]);
}

#[test]
fn unknown_id_is_not_found() {
    let catalog = InMemoryCatalog::new(vec![synth(1, &[1])]).unwrap();
    assert_eq!(
        catalog.get_by_id(SynthId(9)).unwrap_err(),
        CatalogError::NotFound(SynthId(9))
    );
}

#[test]
fn rejects_duplicate_ids_and_out_of_range_ccs() {
    assert!(matches!(
        InMemoryCatalog::new(vec![synth(1, &[1]), synth(1, &[2])]),
        Err(CatalogError::Invalid(_))
    ));
    assert!(matches!(
        InMemoryCatalog::new(vec![synth(1, &[0])]),
        Err(CatalogError::Invalid(_))
    ));
    assert!(matches!(
        InMemoryCatalog::new(vec![synth(1, &[128])]),
        Err(CatalogError::Invalid(_))
    ));
}

#[test]
fn parameter_lookup_by_cc() {
    let definition = synth(3, &[74, 71]);
    assert_eq!(definition.parameter_by_cc(71).map(|p| p.title.as_str()), Some("Param 71"));
    assert!(definition.parameter_by_cc(5).is_none());
}

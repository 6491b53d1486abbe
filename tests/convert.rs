use std::io::Write;

use ifc_tree::error::{Error, GraphError};
use ifc_tree::export::{export_csv, export_json};
use ifc_tree::model::{NoGeometry, Primitive, RootDetails};
use ifc_tree::parser::StepFile;
use ifc_tree::{convert_ifc_file, load_ifc_file, project, Graph};
use pretty_assertions::assert_eq;

const HOUSE: &str = "ISO-10303-21;
HEADER;
FILE_DESCRIPTION(('ViewDefinition [ReferenceView]'),'2;1');
FILE_NAME('house.ifc','2024-05-01T10:00:00',(''),(''),'','','');
FILE_SCHEMA(('IFC4'));
ENDSEC;
DATA;
#1=IFCPROJECT('0001',#90,'House',$,$,'Small house',$,(#91),#92);
#2=IFCSITE('0002',#90,'Site',$,$,$,$,$,.ELEMENT.,$,$,$,$,$);
#3=IFCRELAGGREGATES('0003',#90,$,$,#1,(#2));
#4=IFCBUILDING('0004',#90,'Building',$,$,$,$,$,.ELEMENT.,$,$,$);
#5=IFCRELAGGREGATES('0005',#90,$,$,#2,(#4));
#6=IFCBUILDINGSTOREY('0006',#90,'Ground floor',$,$,$,$,$,.ELEMENT.,0.);
#7=IFCRELAGGREGATES('0007',#90,$,$,#4,(#6));
#10=IFCWALL('0010',#90,'Wall \\X2\\00E9\\X0\\ast',$,$,$,$,$,$);
#11=IFCDOOR('0011',#90,'Front door',$,$,$,$,$,$,$,$,$,$);
#12=IFCRELCONTAINEDINSPATIALSTRUCTURE('0012',#90,$,$,(#10,#11),#6);
#20=IFCPROPERTYSET('0020',#90,'Pset_WallCommon',$,(#21,#22));
#21=IFCPROPERTYSINGLEVALUE('IsExternal',$,IFCBOOLEAN(.T.),$);
#22=IFCPROPERTYSINGLEVALUE('ThermalTransmittance',$,IFCTHERMALTRANSMITTANCEMEASURE(0.24),$);
#23=IFCRELDEFINESBYPROPERTIES('0023',#90,$,$,(#10),#20);
#24=IFCELEMENTQUANTITY('0024',#90,'Qto_DoorBaseQuantities',$,$,(#25));
#25=IFCQUANTITYAREA('Area',$,$,1.89,$);
#26=IFCRELDEFINESBYPROPERTIES('0026',#90,$,$,(#11),#24);
#90=IFCOWNERHISTORY(#93,#94,$,.ADDED.,$,$,$,1714557600);
ENDSEC;
END-ISO-10303-21;
";

fn write_temp(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn converts_a_small_house() {
    let file = write_temp(HOUSE);
    let tree = convert_ifc_file(file.path(), &NoGeometry).unwrap();

    assert_eq!(tree.id.as_deref(), Some("0001"));
    assert_eq!(tree.name, "House");
    assert!(matches!(
        &tree.details,
        Some(RootDetails::Project(p)) if p.long_name.as_deref() == Some("Small house")
    ));

    let path: Vec<&str> = tree
        .iter()
        .take(4)
        .map(|n| n.ifc_type.as_str())
        .collect();
    assert_eq!(path, vec!["IFCPROJECT", "IFCSITE", "IFCBUILDING", "IFCBUILDINGSTOREY"]);

    let storey = tree.find_by_guid("0006").unwrap();
    let names: Vec<&str> = storey.children.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["Wall éast", "Front door"]);

    let wall = tree.find_by_guid("0010").unwrap();
    assert_eq!(
        wall.properties["Pset_WallCommon"]["IsExternal"],
        Primitive::Bool(true)
    );
    assert_eq!(
        wall.properties["Pset_WallCommon"]["ThermalTransmittance"],
        Primitive::Number(0.24)
    );

    let door = tree.find_by_guid("0011").unwrap();
    assert_eq!(
        door.properties["Qto_DoorBaseQuantities"]["Area"],
        Primitive::Number(1.89)
    );
    assert_eq!(tree.count(), 6);
}

#[test]
fn project_with_one_site() {
    let store = StepFile::parse(
        "DATA;
#1=IFCPROJECT('proj-guid',$,'P',$,$,$,$,$,$);
#2=IFCSITE('site-guid',$,'S',$,$,$,$,$,.ELEMENT.,$,$,$,$,$);
#3=IFCRELAGGREGATES('rel-guid',$,$,$,#1,(#2));
ENDSEC;",
    )
    .unwrap();
    let graph = Graph::build(store).unwrap();
    let tree = project(&graph, &NoGeometry).unwrap();

    assert_eq!(tree.id.as_deref(), Some("proj-guid"));
    assert_eq!(tree.children.len(), 1);
    assert_eq!(tree.children[0].ifc_type, "IFCSITE");
    assert_eq!(tree.children[0].id.as_deref(), Some("site-guid"));
}

#[test]
fn file_without_project_fails_before_projection() {
    let file = write_temp("DATA;\n#1=IFCWALL('w',$,$,$,$,$,$,$,$);\nENDSEC;\n");
    let err = load_ifc_file(file.path()).unwrap_err();
    assert!(matches!(err, Error::Graph(GraphError::MissingProject)));
}

#[test]
fn missing_file_is_a_parse_error() {
    let err = load_ifc_file("/nonexistent/model.ifc").unwrap_err();
    assert!(matches!(err, Error::Parse(_)));
}

#[test]
fn exports_json_and_csv() {
    let file = write_temp(HOUSE);
    let tree = convert_ifc_file(file.path(), &NoGeometry).unwrap();
    let dir = tempfile::tempdir().unwrap();

    let json_path = dir.path().join("house.json");
    export_json(&tree, &json_path).unwrap();
    let value: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&json_path).unwrap()).unwrap();
    assert_eq!(value["children"][0]["ifc_type"], "IFCSITE");

    let csv_path = dir.path().join("house.csv");
    export_csv(&tree, &csv_path).unwrap();
    let rows = std::fs::read_to_string(&csv_path).unwrap();
    assert_eq!(rows.lines().count(), 1 + tree.count());
}

//! Integration test for table dispatch over heterogeneous shapes.

use keystone_core::{
    DispatchError, DispatchTable, Instance, InterfaceDescriptor, Operation, SlotSignature, Value,
    ValueKind,
};

struct Circle {
    name: &'static str,
    radius: f64,
}

struct Rectangle {
    name: &'static str,
    width: f64,
    height: f64,
}

fn shape_interface() -> InterfaceDescriptor {
    InterfaceDescriptor::define(
        "shape",
        [
            ("area", SlotSignature::nullary(ValueKind::Float)),
            ("render", SlotSignature::nullary(ValueKind::Text)),
        ],
    )
    .unwrap()
}

fn circle_table(shape: &InterfaceDescriptor) -> DispatchTable<Circle> {
    DispatchTable::bind(
        shape,
        "circle",
        [
            (
                "area",
                Operation::new(SlotSignature::nullary(ValueKind::Float), |c: &Circle, _| {
                    Value::Float(std::f64::consts::PI * c.radius * c.radius)
                }),
            ),
            (
                "render",
                Operation::new(SlotSignature::nullary(ValueKind::Text), |c: &Circle, _| {
                    Value::Text(format!("circle {} r={:.2}", c.name, c.radius))
                }),
            ),
        ],
    )
    .unwrap()
}

fn rectangle_table(shape: &InterfaceDescriptor) -> DispatchTable<Rectangle> {
    DispatchTable::bind(
        shape,
        "rectangle",
        [
            (
                "area",
                Operation::new(
                    SlotSignature::nullary(ValueKind::Float),
                    |r: &Rectangle, _| Value::Float(r.width * r.height),
                ),
            ),
            (
                "render",
                Operation::new(
                    SlotSignature::nullary(ValueKind::Text),
                    |r: &Rectangle, _| {
                        Value::Text(format!(
                            "rectangle {} {:.2}x{:.2}",
                            r.name, r.width, r.height
                        ))
                    },
                ),
            ),
        ],
    )
    .unwrap()
}

fn area_of(instance: &Instance) -> f64 {
    instance.invoke("area", &[]).unwrap().as_float().unwrap()
}

#[test]
fn test_each_variant_reports_its_own_area() {
    let shape = shape_interface();
    let circles = circle_table(&shape);
    let rectangles = rectangle_table(&shape);

    let shapes: Vec<Instance> = vec![
        circles.construct(Circle {
            name: "A",
            radius: 5.0,
        }),
        rectangles.construct(Rectangle {
            name: "B",
            width: 5.0,
            height: 1.0,
        }),
    ];

    let areas: Vec<f64> = shapes.iter().map(area_of).collect();
    assert!((areas[0] - std::f64::consts::PI * 25.0).abs() < 1e-9);
    assert!((areas[1] - 5.0).abs() < f64::EPSILON);

    let rendered: Vec<String> = shapes
        .iter()
        .map(|s| s.invoke("render", &[]).unwrap().as_text().unwrap().to_owned())
        .collect();
    assert_eq!(rendered, ["circle A r=5.00", "rectangle B 5.00x1.00"]);
}

#[test]
fn test_dispatch_ignores_other_variants() {
    let shape = shape_interface();
    let circles = circle_table(&shape);
    let rectangles = rectangle_table(&shape);

    // Many rectangles registered alongside one circle.
    let mut shapes: Vec<Instance> = (1..=50)
        .map(|i| {
            rectangles.construct(Rectangle {
                name: "R",
                width: f64::from(i),
                height: 2.0,
            })
        })
        .collect();
    shapes.push(circles.construct(Circle {
        name: "C",
        radius: 1.0,
    }));

    let circle = shapes.last().unwrap();
    assert!(circle.is_instance_of(&circles));
    assert!(!circle.is_instance_of(&rectangles));
    assert!((area_of(circle) - std::f64::consts::PI).abs() < 1e-12);
    assert!((area_of(&shapes[9]) - 20.0).abs() < f64::EPSILON);
}

#[test]
fn test_slot_id_dispatch_matches_name_dispatch() {
    let shape = shape_interface();
    let area = shape.slot("area").unwrap();
    let rect = rectangle_table(&shape).construct(Rectangle {
        name: "B",
        width: 4.0,
        height: 6.0,
    });

    assert_eq!(rect.invoke_slot(area, &[]).unwrap(), Value::Float(24.0));
    assert_eq!(
        rect.invoke_slot(area, &[]).unwrap(),
        rect.invoke("area", &[]).unwrap()
    );
}

#[test]
fn test_bind_requires_exactly_one_implementation_per_slot() {
    let shape = shape_interface();
    let area = || {
        Operation::new(SlotSignature::nullary(ValueKind::Float), |c: &Circle, _| {
            Value::Float(c.radius)
        })
    };
    let render = || {
        Operation::new(SlotSignature::nullary(ValueKind::Text), |c: &Circle, _| {
            Value::Text(c.name.to_owned())
        })
    };

    assert!(DispatchTable::bind(&shape, "circle", [("area", area()), ("render", render())]).is_ok());
    assert!(matches!(
        DispatchTable::bind(&shape, "circle", [("area", area())]),
        Err(DispatchError::IncompleteBinding { .. })
    ));
    assert!(matches!(
        DispatchTable::bind(
            &shape,
            "circle",
            [("area", area()), ("render", render()), ("render", render())]
        ),
        Err(DispatchError::DuplicateImplementation { .. })
    ));
    assert!(matches!(
        DispatchTable::bind(
            &shape,
            "circle",
            [("area", area()), ("render", render()), ("perimeter", area())]
        ),
        Err(DispatchError::UnknownSlot { .. })
    ));
}

#[test]
fn test_unknown_slot_on_invoke() {
    let shape = shape_interface();
    let circle = circle_table(&shape).construct(Circle {
        name: "A",
        radius: 2.0,
    });
    assert_eq!(
        circle.invoke("perimeter", &[]).unwrap_err(),
        DispatchError::UnknownSlot {
            interface: "shape".to_owned(),
            slot: "perimeter".to_owned(),
        }
    );
}

#[test]
fn test_field_mutation_keeps_binding() {
    let shape = shape_interface();
    let circles = circle_table(&shape);
    let mut circle = circles.construct(Circle {
        name: "A",
        radius: 1.0,
    });

    assert!(circle.fields::<Rectangle>().is_none());
    circle.fields_mut::<Circle>().unwrap().radius = 2.0;

    assert_eq!(circle.variant(), "circle");
    assert!(circle.is_instance_of(&circles));
    assert!((area_of(&circle) - 4.0 * std::f64::consts::PI).abs() < 1e-12);
}

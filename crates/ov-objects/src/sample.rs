//! Demo object graph used as the default root when no file is given

use crate::graph::{ArgSpec, Obj, ObjectGraph};

/// Build a `__main__`-like module that exercises every kind of row:
/// classes with bases and slots, accessor functions, nested modules,
/// mappings, sequences, atomic values, a native callable and a cycle.
pub fn sample_module(g: &ObjectGraph) -> Obj {
    let main = g.module("__main__");
    main.set_attr("__file__", g.str("sample.py"));
    main.set_attr("__package__", g.none());

    let os = g.module("os");
    os.set_attr("sep", g.str("/"));
    os.set_attr("getcwd", g.native("getcwd"));
    os.set_attr("environ", g.dict(vec![(g.str("HOME"), g.str("/home/demo"))]));
    main.set_attr("os", os);
    main.set_attr("sys", g.module("sys"));

    let point = g.class("Point", &[], Some(&["x", "y"][..]));
    point.set_attr("__doc__", g.str("A point with fixed slots."));
    let origin = g.instance(&point);
    origin.set_slot("x", g.int(0));
    origin.set_slot("y", g.int(0));
    main.set_attr("Point", point);
    main.set_attr("origin", origin.clone());

    let shape = g.class("Shape", &[], None);
    shape.set_attr("area", g.function("area", &["self"]));
    let circle = g.class("Circle", &[shape.clone()], None);
    circle.set_attr("get_radius", g.function("get_radius", &["self"]));
    circle.set_attr("set_radius", g.function("set_radius", &["self", "value"]));
    circle.set_attr("unset_radius", g.function("unset_radius", &["self"]));
    circle.set_attr("area", g.function("area", &["self"]));
    circle.set_attr(
        "unit",
        g.static_method(&g.function_with_spec(
            "unit",
            ArgSpec {
                args: Vec::new(),
                varargs: Some("args".to_string()),
                varkw: Some("kwargs".to_string()),
            },
        )),
    );
    circle.set_attr(
        "from_diameter",
        g.class_method(&g.function("from_diameter", &["cls", "d"])),
    );
    main.set_attr("Shape", shape);
    main.set_attr("Circle", circle.clone());

    let c = g.instance(&circle);
    c.set_attr("radius", g.float(2.5));
    c.set_attr("center", origin);
    c.set_attr("area", g.method("area", &c));
    main.set_attr("circle", c);

    main.set_attr(
        "settings",
        g.dict(vec![
            (g.str("name"), g.str("demo")),
            (g.str("debug"), g.boolean(true)),
            (g.str("level"), g.int(3)),
            (g.str("ratio"), g.float(0.75)),
        ]),
    );
    main.set_attr(
        "grid",
        g.dict(vec![
            (g.tuple(vec![g.int(1), g.int(0)]), g.str("b")),
            (g.tuple(vec![g.int(0), g.int(1)]), g.str("a")),
        ]),
    );
    // Keys of mixed kinds cannot be ordered
    main.set_attr(
        "mixed",
        g.dict(vec![(g.str("a"), g.int(1)), (g.int(2), g.int(2))]),
    );

    main.set_attr("numbers", g.list(vec![g.int(1), g.int(2), g.int(3)]));
    main.set_attr("pair", g.tuple(vec![g.str("left"), g.str("right")]));
    main.set_attr("greeting", g.str("Hello, object viewer! ".repeat(6)));
    main.set_attr("payload", g.bytes(b"\x00\x01binary\xff".to_vec()));
    main.set_attr("nothing", g.none());
    main.set_attr("len", g.native("len"));

    let cycle = g.list(vec![g.int(1)]);
    cycle.push(cycle.clone());
    main.set_attr("cycle", cycle);

    main
}

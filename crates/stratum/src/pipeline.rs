//! Layout pipeline.
//!
//! [`layout_with_registry`] copies a [`GraphSnapshot`] into a private working graph, runs the
//! phases in order and reads the geometry back out. The snapshot is never modified, so one
//! snapshot can be laid out any number of times, also from several threads.

use crate::builder::GraphSnapshot;
use crate::cluster::ContainerTree;
use crate::config::{Justify, LayoutConfig, RoutingMode};
use crate::error::{Error, Result};
use crate::graphlib::{EdgeKey, Graph, GraphOptions};
use crate::input::NodeSpec;
use crate::model::{
    DummyKind, EdgeLabel, GraphLabel, LabelPos, NodeLabel, Point, Rect, Size, WorkGraph,
};
use crate::order::{self, OrderOptions};
use crate::output::{CellGeometry, ContainerGeometry, EdgeGeometry, LayoutResult, NodeGeometry};
use crate::position::{self, PositionOptions};
use crate::rank::{self, constraints};
use crate::record::CellTree;
use crate::registry::Registry;
use crate::routing::{self, Grid, RouteOptions};
use crate::shape::TextMeasurer;
use crate::{acyclic, coordinate_system, normalize, self_edges, util};
use indexmap::IndexMap;
use rustc_hash::FxHashSet as HashSet;

/// Where a caller-facing edge lives in the working graph.
#[derive(Debug, Clone)]
struct EdgeInfo {
    id: String,
    /// Ends as the caller named them.
    declared: (String, String),
    /// Working-graph tail; the first member when the edge starts at a container.
    tail: String,
    head: String,
    tail_container: Option<usize>,
    head_container: Option<usize>,
    routing: RoutingMode,
    tail_port: Option<String>,
    head_port: Option<String>,
}

impl EdgeInfo {
    fn key(&self) -> EdgeKey {
        EdgeKey::new(self.tail.clone(), self.head.clone(), Some(self.id.clone()))
    }
}

/// Lays out `snapshot` with the built-in shapes and measurers.
pub fn layout(snapshot: &GraphSnapshot) -> Result<LayoutResult> {
    layout_with_registry(snapshot, &Registry::with_defaults())
}

pub fn layout_with_registry(snapshot: &GraphSnapshot, registry: &Registry) -> Result<LayoutResult> {
    let _span = tracing::debug_span!(
        "layout",
        nodes = snapshot.node_count(),
        edges = snapshot.edges().len(),
        containers = snapshot.containers().len()
    )
    .entered();

    let config = snapshot.config();
    let tree = snapshot.containers();
    let measurer = registry.measurer_or_default(&config.measurer);

    let (mut g, edges) = {
        let _s = tracing::debug_span!("build_work_graph").entered();
        build_work_graph(snapshot, registry, measurer.as_ref())?
    };

    self_edges::remove_self_edges(&mut g);
    make_space_for_edge_labels(&mut g);

    {
        let _s = tracing::debug_span!("rank").entered();
        let plan = constraints::plan(&g.node_ids(), tree)?;
        rank::assign_ranks(&mut g, &plan)?;
        rank::orient_edges(&mut g);
        assign_label_ranks(&mut g);
    }

    {
        let _s = tracing::debug_span!("normalize").entered();
        normalize::run(&mut g);
    }

    {
        let _s = tracing::debug_span!("order").entered();
        let crossings = order::order(
            &mut g,
            &OrderOptions {
                max_iterations: config.max_order_iterations,
                ..Default::default()
            },
        );
        tracing::debug!(crossings, "ordering done");
    }

    let labeled: Vec<bool> = tree
        .specs()
        .iter()
        .map(|c| c.is_bordered() && c.label.as_deref().is_some_and(|l| !l.is_empty()))
        .collect();

    {
        let _s = tracing::debug_span!("position").entered();
        coordinate_system::adjust(&mut g);
        self_edges::insert_self_edges(&mut g);
        position::position(
            &mut g,
            &PositionOptions {
                mode: config.coordinates,
                cluster_padding: config.cluster_padding,
                cluster_label_height: config.cluster_label_height,
            },
            &labeled,
        )?;
        self_edges::position_self_edges(&mut g);
        normalize::undo(&mut g);
        fixup_edge_label_coords(&mut g);
        coordinate_system::undo(&mut g);
    }

    let flat_ids = restore_flat_edges(&mut g);
    let mut reversed_ids: HashSet<String> = HashSet::default();
    g.for_each_edge(|_, e| {
        if e.reversed {
            if let Some(name) = &e.forward_name {
                reversed_ids.insert(name.clone());
            }
        }
    });
    acyclic::undo(&mut g);

    let mut boxes = container_boxes(&g, tree, config, &labeled);
    let mut records = place_records(snapshot, &g, measurer.as_ref(), config);

    {
        let _s = tracing::debug_span!("edges").entered();
        for info in &edges {
            finish_edge(&mut g, snapshot, registry, &records, &boxes, info);
        }
        if edges.iter().any(|e| e.routing == RoutingMode::Orthogonal) {
            route_orthogonal(&mut g, tree, config, &boxes, &edges);
        }
    }

    let bounds = translate(&mut g, &mut boxes, config)?;
    for (id, tree) in records.iter_mut() {
        if let Some(n) = g.node(id) {
            tree.place(top_left(n));
        }
    }

    let result = collect(
        snapshot,
        &g,
        measurer.as_ref(),
        &records,
        &boxes,
        &edges,
        &flat_ids,
        &reversed_ids,
        bounds,
    );
    tracing::debug!(
        width = result.bounds.width,
        height = result.bounds.height,
        "layout done"
    );
    Ok(result)
}

fn build_work_graph(
    snapshot: &GraphSnapshot,
    registry: &Registry,
    measurer: &dyn TextMeasurer,
) -> Result<(WorkGraph, Vec<EdgeInfo>)> {
    let config = snapshot.config();
    let tree = snapshot.containers();

    let mut g: WorkGraph = Graph::new(GraphOptions::directed().multigraph());
    g.set_graph(GraphLabel {
        rankdir: config.rank_dir,
        nodesep: config.node_sep,
        ranksep: config.rank_sep,
        edgesep: config.edge_sep,
        marginx: config.margin_x,
        marginy: config.margin_y,
        ranker: config.ranker,
        acyclicer: config.acyclicer,
        ..Default::default()
    });

    for node in snapshot.nodes() {
        let size = node_size(snapshot, registry, measurer, node);
        g.set_node(
            node.id.clone(),
            NodeLabel {
                width: size.width,
                height: size.height,
                cluster_path: tree.bordered_path(&node.id),
                ..Default::default()
            },
        );
    }

    // A bordered container with a declared size but nothing inside still needs room.
    for ix in 0..tree.len() {
        let spec = tree.spec(ix);
        let Some(min) = spec.min_size else {
            continue;
        };
        if !spec.is_bordered()
            || !tree.children_ix(ix).is_empty()
            || !tree.members_recursive_ix(ix).is_empty()
        {
            continue;
        }
        let min = min.clamped();
        g.set_node(
            spec.id.clone(),
            NodeLabel {
                width: min.width,
                height: min.height,
                dummy: Some(DummyKind::Container),
                cluster_path: container_path(tree, ix),
                ..Default::default()
            },
        );
    }

    let mut infos: Vec<EdgeInfo> = Vec::with_capacity(snapshot.edges().len());
    for (i, spec) in snapshot.edges().iter().enumerate() {
        let id = spec.id.clone().unwrap_or_else(|| format!("e{i}"));
        let (tail, tail_container) = endpoint(tree, &g, &spec.tail)?;
        let (head, head_container) = endpoint(tree, &g, &spec.head)?;
        let label_size = spec
            .label
            .as_deref()
            .filter(|t| !t.is_empty())
            .map(|t| measurer.measure(t).clamped())
            .unwrap_or_default();
        let weight = if spec.weight.is_finite() {
            spec.weight.max(0.0)
        } else {
            1.0
        };
        g.set_edge_named(
            tail.clone(),
            head.clone(),
            Some(id.clone()),
            Some(EdgeLabel {
                width: label_size.width,
                height: label_size.height,
                labelpos: spec.labelpos,
                minlen: spec.minlen,
                weight,
                constraint: spec.constraint,
                ..Default::default()
            }),
        );
        infos.push(EdgeInfo {
            id,
            declared: (spec.tail.clone(), spec.head.clone()),
            tail,
            head,
            tail_container,
            head_container,
            routing: spec.routing.unwrap_or(config.routing),
            tail_port: spec.tail_port.clone(),
            head_port: spec.head_port.clone(),
        });
    }

    tracing::debug!(
        nodes = g.node_count(),
        edges = g.edge_count(),
        "working graph built"
    );
    Ok((g, infos))
}

fn node_size(
    snapshot: &GraphSnapshot,
    registry: &Registry,
    measurer: &dyn TextMeasurer,
    node: &NodeSpec,
) -> Size {
    let config = snapshot.config();
    let natural = match snapshot.record(&node.id) {
        Some(tree) => {
            let mut tree = tree.clone();
            tree.measure(measurer, config.record_padding)
        }
        None => {
            let label = measurer.measure(node.display_text()).clamped();
            registry
                .strategy_for(&node.shape)
                .size_for_label(label, config.node_padding)
        }
    };
    let min = Size::new(
        node.min_width.unwrap_or(0.0),
        node.min_height.unwrap_or(0.0),
    )
    .clamped();
    natural.clamped().max(min)
}

/// Bordered containers enclosing container `ix`, itself included when bordered.
fn container_path(tree: &ContainerTree, ix: usize) -> Vec<usize> {
    let mut path: Vec<usize> = Vec::new();
    if tree.spec(ix).is_bordered() {
        path.push(ix);
    }
    let mut cur = tree.effective_father_ix(ix);
    while let Some(c) = cur {
        path.push(c);
        cur = tree.effective_father_ix(c);
    }
    path.reverse();
    path
}

/// Working-graph node standing in for edge end `id`.
fn endpoint(tree: &ContainerTree, g: &WorkGraph, id: &str) -> Result<(String, Option<usize>)> {
    let Some(ix) = tree.index_of(id) else {
        return Ok((id.to_string(), None));
    };
    if let Some(first) = tree.members_recursive_ix(ix).into_iter().next() {
        return Ok((first, Some(ix)));
    }
    let mut stack = vec![ix];
    while let Some(c) = stack.pop() {
        let cid = &tree.spec(c).id;
        if g.has_node(cid) {
            return Ok((cid.clone(), Some(ix)));
        }
        stack.extend(tree.children_ix(c).iter().rev().copied());
    }
    Err(Error::invalid_structure(format!(
        "container `{id}` has nothing an edge could attach to"
    )))
}

/// Labeled edges get an extra rank for their label dummy.
fn make_space_for_edge_labels(g: &mut WorkGraph) {
    let mut any_label = false;
    g.for_each_edge(|_, e| any_label |= e.has_label());
    if !any_label {
        return;
    }
    g.graph_mut().ranksep /= 2.0;
    let horizontal = g.graph().rankdir.is_horizontal();
    g.for_each_edge_mut(|_, e| {
        e.minlen = e.minlen.saturating_mul(2);
        if e.has_label() && e.labelpos != LabelPos::Center {
            if horizontal {
                e.height += e.labeloffset;
            } else {
                e.width += e.labeloffset;
            }
        }
    });
}

fn assign_label_ranks(g: &mut WorkGraph) {
    let mut ranks: Vec<(EdgeKey, i32)> = Vec::new();
    g.for_each_edge(|e, lbl| {
        if !lbl.has_label() {
            return;
        }
        let rv = g.node(&e.v).and_then(|n| n.rank).unwrap_or(0);
        let rw = g.node(&e.w).and_then(|n| n.rank).unwrap_or(0);
        if rw - rv >= 2 {
            ranks.push((e.clone(), rv + (rw - rv) / 2));
        }
    });
    for (e, r) in ranks {
        if let Some(lbl) = g.edge_mut_by_key(&e) {
            lbl.label_rank = Some(r);
        }
    }
}

/// Moves side labels off the edge line; runs in the top-to-bottom frame.
fn fixup_edge_label_coords(g: &mut WorkGraph) {
    g.for_each_edge_mut(|_, e| {
        let Some(x) = e.x else {
            return;
        };
        match e.labelpos {
            LabelPos::Center => {}
            LabelPos::Left => {
                e.width -= e.labeloffset;
                e.x = Some(x - e.width / 2.0 - e.labeloffset);
            }
            LabelPos::Right => {
                e.width -= e.labeloffset;
                e.x = Some(x + e.width / 2.0 + e.labeloffset);
            }
        }
    });
}

/// Puts parked same-rank edges back into the graph and returns their ids.
fn restore_flat_edges(g: &mut WorkGraph) -> HashSet<String> {
    let flat = std::mem::take(&mut g.graph_mut().flat_edges);
    let mut ids: HashSet<String> = HashSet::default();
    for (key, label) in flat {
        if let Some(name) = &key.name {
            ids.insert(name.clone());
        }
        g.set_edge_key(key, label);
    }
    ids
}

/// Boxes per container index. Bordered boxes get padding and a label band; loose ones are the
/// plain union of what they hold.
fn container_boxes(
    g: &WorkGraph,
    tree: &ContainerTree,
    config: &LayoutConfig,
    labeled: &[bool],
) -> Vec<Option<Rect>> {
    let mut boxes: Vec<Option<Rect>> = vec![None; tree.len()];
    let mut order: Vec<usize> = (0..tree.len()).collect();
    order.sort_by_key(|&ix| std::cmp::Reverse(tree.depth(&tree.spec(ix).id).unwrap_or(0)));

    let horizontal = config.rank_dir.is_horizontal();
    let pad = config.cluster_padding;
    for ix in order {
        let spec = tree.spec(ix);
        let mut acc: Option<Rect> = None;
        let mut add = |r: Rect| acc = Some(acc.map_or(r, |a| a.union(&r)));
        for node in &spec.nodes {
            if tree.node_father_ix(node) != Some(ix) {
                continue;
            }
            if let Some(n) = g.node(node) {
                add(util::node_rect(n));
            }
        }
        if let Some(n) = g.node(&spec.id) {
            if n.dummy == Some(DummyKind::Container) {
                add(util::node_rect(n));
            }
        }
        for &child in tree.children_ix(ix) {
            if let Some(b) = boxes[child] {
                add(b);
            }
        }
        let Some(mut rect) = acc else {
            continue;
        };
        if spec.is_bordered() {
            rect = rect.inflate(pad, pad);
            if labeled.get(ix).copied().unwrap_or(false) && !horizontal {
                rect.y -= config.cluster_label_height;
                rect.height += config.cluster_label_height;
            }
            if let Some(min) = spec.min_size {
                let min = min.clamped();
                if rect.width < min.width {
                    rect.x -= (min.width - rect.width) / 2.0;
                    rect.width = min.width;
                }
                if rect.height < min.height {
                    rect.y -= (min.height - rect.height) / 2.0;
                    rect.height = min.height;
                }
            }
        }
        boxes[ix] = Some(rect);
    }
    boxes
}

fn top_left(n: &NodeLabel) -> Point {
    let r = util::node_rect(n);
    Point::new(r.x, r.y)
}

/// Measures, stretches and places every record's cells inside its node.
fn place_records(
    snapshot: &GraphSnapshot,
    g: &WorkGraph,
    measurer: &dyn TextMeasurer,
    config: &LayoutConfig,
) -> IndexMap<String, CellTree> {
    let mut out: IndexMap<String, CellTree> = IndexMap::new();
    for node in snapshot.nodes() {
        let (Some(tree), Some(n)) = (snapshot.record(&node.id), g.node(&node.id)) else {
            continue;
        };
        let mut tree = tree.clone();
        tree.measure(measurer, config.record_padding);
        tree.resize(Size::new(n.width, n.height));
        tree.place(top_left(n));
        out.insert(node.id.clone(), tree);
    }
    out
}

/// Where an edge leaves node `id` heading for `toward`.
fn attach_point(
    g: &WorkGraph,
    snapshot: &GraphSnapshot,
    registry: &Registry,
    records: &IndexMap<String, CellTree>,
    id: &str,
    port: Option<&str>,
    toward: Point,
) -> Point {
    let Some(n) = g.node(id) else {
        return toward;
    };
    let rect = util::node_rect(n);
    if let Some(port) = port {
        let cell = records
            .get(id)
            .and_then(|t| t.cell_by_port(port).and_then(|c| t.cell(c)));
        match cell {
            Some(cell) => {
                let from = cell.rect().center();
                return if rect.contains_strictly(toward) {
                    from
                } else {
                    util::segment_exit(&rect, from, toward)
                };
            }
            None => tracing::warn!(node = id, port, "unknown record port, using the node outline"),
        }
    }
    match snapshot.node(id) {
        Some(spec) => registry.strategy_for(&spec.shape).intersect(&rect, toward),
        None => util::intersect_rect(&rect, toward),
    }
}

/// Drops the leading points inside `rect` and starts the path where it leaves the box.
fn clip_start(points: &mut Vec<Point>, rect: &Rect) {
    let Some(i) = points.iter().position(|p| !rect.contains_strictly(*p)) else {
        return;
    };
    if i == 0 {
        return;
    }
    let exit = util::segment_exit(rect, points[i - 1], points[i]);
    points.drain(..i);
    points.insert(0, exit);
}

fn clip_end(points: &mut Vec<Point>, rect: &Rect) {
    points.reverse();
    clip_start(points, rect);
    points.reverse();
}

/// Adds outline end points to an edge, clips container ends and anchors a missing label.
fn finish_edge(
    g: &mut WorkGraph,
    snapshot: &GraphSnapshot,
    registry: &Registry,
    records: &IndexMap<String, CellTree>,
    boxes: &[Option<Rect>],
    info: &EdgeInfo,
) {
    let key = info.key();
    let Some(label) = g.edge_by_key(&key) else {
        return;
    };
    let center = |id: &str| g.node(id).map(|n| util::node_rect(n).center()).unwrap_or_default();
    let mut points = label.points.clone();

    let toward_tail = points.first().copied().unwrap_or_else(|| center(&info.head));
    let start = attach_point(
        g,
        snapshot,
        registry,
        records,
        &info.tail,
        info.tail_port.as_deref(),
        toward_tail,
    );
    let toward_head = points.last().copied().unwrap_or_else(|| center(&info.tail));
    let end = attach_point(
        g,
        snapshot,
        registry,
        records,
        &info.head,
        info.head_port.as_deref(),
        toward_head,
    );
    points.insert(0, start);
    points.push(end);

    if let Some(b) = info.tail_container.and_then(|ix| boxes[ix]) {
        clip_start(&mut points, &b);
    }
    if let Some(b) = info.head_container.and_then(|ix| boxes[ix]) {
        clip_end(&mut points, &b);
    }

    let Some(label) = g.edge_mut_by_key(&key) else {
        return;
    };
    if label.has_label() && (label.x.is_none() || label.y.is_none()) {
        let mid = points.len() / 2;
        let (a, b) = (points[mid.saturating_sub(1)], points[mid.min(points.len() - 1)]);
        label.x = Some((a.x + b.x) / 2.0);
        label.y = Some((a.y + b.y) / 2.0);
    }
    label.points = points;
}

/// Reroutes orthogonal edges over the free space between nodes.
fn route_orthogonal(
    g: &mut WorkGraph,
    tree: &ContainerTree,
    config: &LayoutConfig,
    boxes: &[Option<Rect>],
    edges: &[EdgeInfo],
) {
    let _s = tracing::debug_span!("route_orthogonal").entered();
    let mut obstacles: Vec<Rect> = Vec::new();
    g.for_each_node(|_, n| obstacles.push(util::node_rect(n)));
    let guides: Vec<Rect> = (0..tree.len())
        .filter(|&ix| tree.spec(ix).is_bordered())
        .filter_map(|ix| boxes[ix])
        .collect();
    let Some(area) = obstacles.iter().chain(&guides).copied().reduce(|a, b| a.union(&b)) else {
        return;
    };
    let margin = config.node_sep.max(config.edge_sep).max(10.0);
    let grid = Grid::build_with_guides(area.inflate(margin, margin), &obstacles, &guides);

    for info in edges {
        if info.routing != RoutingMode::Orthogonal {
            continue;
        }
        if info.tail == info.head && info.tail_container.is_none() && info.head_container.is_none()
        {
            continue;
        }
        let end_box = |node: &str, container: Option<usize>| {
            container
                .and_then(|ix| boxes[ix])
                .or_else(|| g.node(node).map(util::node_rect))
        };
        let (Some(source), Some(target)) = (
            end_box(&info.tail, info.tail_container),
            end_box(&info.head, info.head_container),
        ) else {
            continue;
        };

        let mut related: HashSet<usize> = HashSet::default();
        for (node, container) in [
            (&info.tail, info.tail_container),
            (&info.head, info.head_container),
        ] {
            match container {
                Some(ix) => related.extend(container_path(tree, ix)),
                None => related.extend(tree.bordered_path(node)),
            }
        }
        let avoid: Vec<Rect> = (0..tree.len())
            .filter(|ix| tree.spec(*ix).is_bordered() && !related.contains(ix))
            .filter_map(|ix| boxes[ix])
            .collect();
        let options = RouteOptions {
            bend_penalty: f64::from(config.bend_penalty),
            avoid,
            ..Default::default()
        };

        match routing::route(&grid, &source, &target, &options) {
            Some(points) => {
                if let Some(label) = g.edge_mut_by_key(&info.key()) {
                    label.points = points;
                }
            }
            None => tracing::warn!(edge = %info.id, "no orthogonal route found, keeping the layered path"),
        }
    }
}

/// Shifts everything so the drawing starts at the margins and returns the overall bounds.
fn translate(g: &mut WorkGraph, boxes: &mut [Option<Rect>], config: &LayoutConfig) -> Result<Rect> {
    let mut extent: Option<Rect> = None;
    let mut add = |r: Rect| extent = Some(extent.map_or(r, |a| a.union(&r)));
    let mut finite = true;
    g.for_each_node(|_, n| {
        let r = util::node_rect(n);
        finite &= r.is_finite();
        add(r);
    });
    g.for_each_edge(|_, e| {
        for p in &e.points {
            finite &= p.is_finite();
            add(Rect::new(p.x, p.y, 0.0, 0.0));
        }
        if let (Some(x), Some(y)) = (e.x, e.y) {
            let r = Rect::from_center(Point::new(x, y), e.width, e.height);
            finite &= r.is_finite();
            add(r);
        }
    });
    for b in boxes.iter().flatten() {
        finite &= b.is_finite();
        add(*b);
    }
    if !finite {
        return Err(Error::execution("layout produced non-finite coordinates"));
    }
    let Some(extent) = extent else {
        return Ok(Rect::new(0.0, 0.0, 2.0 * config.margin_x, 2.0 * config.margin_y));
    };

    let dx = config.margin_x - extent.x;
    let dy = config.margin_y - extent.y;
    g.for_each_node_mut(|_, n| {
        if let Some(x) = n.x.as_mut() {
            *x += dx;
        }
        if let Some(y) = n.y.as_mut() {
            *y += dy;
        }
    });
    g.for_each_edge_mut(|_, e| {
        for p in &mut e.points {
            p.x += dx;
            p.y += dy;
        }
        if let Some(x) = e.x.as_mut() {
            *x += dx;
        }
        if let Some(y) = e.y.as_mut() {
            *y += dy;
        }
    });
    for b in boxes.iter_mut().flatten() {
        *b = b.translate(dx, dy);
    }
    Ok(Rect::new(
        0.0,
        0.0,
        extent.width + 2.0 * config.margin_x,
        extent.height + 2.0 * config.margin_y,
    ))
}

#[allow(clippy::too_many_arguments)]
fn collect(
    snapshot: &GraphSnapshot,
    g: &WorkGraph,
    measurer: &dyn TextMeasurer,
    records: &IndexMap<String, CellTree>,
    boxes: &[Option<Rect>],
    edges: &[EdgeInfo],
    flat_ids: &HashSet<String>,
    reversed_ids: &HashSet<String>,
    bounds: Rect,
) -> LayoutResult {
    let config = snapshot.config();
    let mut result = LayoutResult {
        bounds,
        ..Default::default()
    };

    for spec in snapshot.nodes() {
        let Some(n) = g.node(&spec.id) else {
            continue;
        };
        let rect = util::node_rect(n);
        let center = rect.center();
        let cells: Vec<CellGeometry> = records
            .get(&spec.id)
            .map(|tree| {
                tree.cells()
                    .iter()
                    .map(|c| CellGeometry {
                        rect: c.rect(),
                        text: c.text.clone(),
                        port: c.port.clone(),
                        is_leaf: c.is_leaf(),
                    })
                    .collect()
            })
            .unwrap_or_default();
        let label_anchor = if cells.is_empty() {
            let text = measurer.measure(spec.display_text()).clamped();
            let inset = config.node_padding + text.width / 2.0;
            match config.justify {
                Justify::Center => center,
                Justify::Left => Point::new((rect.x + inset).min(center.x), center.y),
                Justify::Right => Point::new((rect.right() - inset).max(center.x), center.y),
            }
        } else {
            center
        };
        result.nodes.insert(
            spec.id.clone(),
            NodeGeometry {
                center,
                size: Size::new(n.width, n.height),
                rank: n.rank.unwrap_or(0),
                order: n.order.unwrap_or(0),
                label_anchor,
                cells,
            },
        );
    }

    for info in edges {
        let Some(label) = g.edge_by_key(&info.key()) else {
            continue;
        };
        let first = label.points.first().copied().unwrap_or_default();
        let last = label.points.last().copied().unwrap_or_default();
        let (label_anchor, label_size) = match (label.has_label(), label.x, label.y) {
            (true, Some(x), Some(y)) => (
                Some(Point::new(x, y)),
                Some(Size::new(label.width, label.height)),
            ),
            _ => (None, None),
        };
        let (tail, head) = info.declared.clone();
        result.edges.insert(
            info.id.clone(),
            EdgeGeometry {
                tail,
                head,
                points: label.points.clone(),
                routing: info.routing,
                label_anchor,
                label_size,
                tail_anchor: first,
                head_anchor: last,
                reversed: reversed_ids.contains(&info.id),
                flat: flat_ids.contains(&info.id),
            },
        );
    }

    let pad = config.cluster_padding;
    for (ix, spec) in snapshot.containers().specs().iter().enumerate() {
        let Some(rect) = boxes[ix] else {
            continue;
        };
        let has_label = spec.is_bordered() && spec.label.as_deref().is_some_and(|l| !l.is_empty());
        let band = if config.rank_dir.is_horizontal() {
            pad
        } else {
            config.cluster_label_height.max(pad)
        };
        result.containers.insert(
            spec.id.clone(),
            ContainerGeometry {
                rect,
                bordered: spec.is_bordered(),
                label_anchor: has_label
                    .then(|| Point::new(rect.center().x, rect.y + band / 2.0)),
            },
        );
    }
    result
}

use crate::models::{RouteMeta, RouteNode, is_external_path};

/// flatten_routes
///
/// Rewrites the route tree so that no route nests deeper than two levels
/// (top-level record plus its children), which is what keep-alive caching
/// of third-level and deeper views needs.
///
/// Disabled, it returns the tree unchanged. Enabled, every grouping child of a
/// top-level record is dissolved: its leaf descendants move directly under the
/// top-level record with composite paths (`level2/level3`), keeping their own
/// name, title and cache flag. A group that redirects or renders leaves a
/// hidden, unnamed, childless record at its own composite path, so every
/// location of the original tree still resolves; plain groups vanish and a
/// single-child branch collapses into one entry. Flattening a flat tree
/// returns it as is.
pub fn flatten_routes(routes: &[RouteNode], enabled: bool) -> Vec<RouteNode> {
    if !enabled {
        return routes.to_vec();
    }
    routes.iter().map(flatten_module).collect()
}

/// True when some child of `module` has children of its own.
pub fn is_multi_level(module: &RouteNode) -> bool {
    module.children.iter().any(|child| !child.is_leaf())
}

fn flatten_module(module: &RouteNode) -> RouteNode {
    if !is_multi_level(module) {
        return module.clone();
    }

    let mut children = Vec::new();
    for child in &module.children {
        lift_leaves(child, "", &RouteMeta::default(), &mut children);
    }
    tracing::debug!(
        module = %module.path,
        before = module.children.len(),
        after = children.len(),
        "flattened multi-level route module"
    );

    RouteNode {
        children,
        ..module.clone()
    }
}

/// Pushes every leaf below `node` into `out`, with its path prefixed by the
/// dissolved ancestors' segments and their visibility/icons folded into its meta.
fn lift_leaves(node: &RouteNode, prefix: &str, carried: &RouteMeta, out: &mut Vec<RouteNode>) {
    let path = prefix_segment(prefix, &node.path);

    if node.is_leaf() {
        out.push(RouteNode {
            path,
            meta: inherit_from_groups(&node.meta, carried),
            ..node.clone()
        });
        return;
    }

    // A group that redirects or renders keeps its own location as a hidden,
    // childless, unnamed record so `/demo/level2` still resolves.
    if node.redirect.is_some() || node.view.is_some() {
        out.push(RouteNode {
            path: path.clone(),
            name: None,
            alias: None,
            meta: RouteMeta {
                hidden: true,
                keep_alive: false,
                affix: false,
                ..inherit_from_groups(&node.meta, carried)
            },
            children: Vec::new(),
            ..node.clone()
        });
    }

    let carried = inherit_from_groups(
        &RouteMeta {
            hidden: node.meta.hidden,
            svg_icon: node.meta.svg_icon.clone(),
            el_icon: node.meta.el_icon.clone(),
            ..RouteMeta::default()
        },
        carried,
    );
    for child in &node.children {
        lift_leaves(child, &path, &carried, out);
    }
}

/// Only visibility and icons flow down from dissolved groups; the leaf's
/// title and cache flags are its own.
fn inherit_from_groups(own: &RouteMeta, carried: &RouteMeta) -> RouteMeta {
    RouteMeta {
        hidden: own.hidden || carried.hidden,
        svg_icon: own.svg_icon.clone().or_else(|| carried.svg_icon.clone()),
        el_icon: own.el_icon.clone().or_else(|| carried.el_icon.clone()),
        ..own.clone()
    }
}

fn prefix_segment(prefix: &str, segment: &str) -> String {
    if prefix.is_empty() || segment.starts_with('/') || is_external_path(segment) {
        return segment.to_string();
    }
    if segment.is_empty() {
        return prefix.to_string();
    }
    format!("{}/{}", prefix.trim_end_matches('/'), segment)
}

/// Depth of the deepest node, counting top-level records as depth 1.
pub fn max_depth(routes: &[RouteNode]) -> usize {
    routes
        .iter()
        .map(|node| 1 + max_depth(&node.children))
        .max()
        .unwrap_or(0)
}

/// Names of all leaves, in tree order.
pub fn leaf_names(routes: &[RouteNode]) -> Vec<String> {
    let mut names = Vec::new();
    collect_leaf_names(routes, &mut names);
    names
}

fn collect_leaf_names(routes: &[RouteNode], out: &mut Vec<String>) {
    for node in routes {
        if node.is_leaf() {
            out.extend(node.name.clone());
        } else {
            collect_leaf_names(&node.children, out);
        }
    }
}

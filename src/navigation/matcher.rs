use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::location::Location;
use super::table::join_path;
use crate::models::{RouteMeta, RouteNode};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Static(String),
    /// `:id`: exactly one segment.
    Param(String),
    /// `:path(.*)` or `:pathMatch(.*)*`: the rest of the path, possibly empty.
    Tail(String),
}

/// RouteRecord
///
/// One matchable entry compiled from the tree: an absolute pattern plus the
/// record's name, redirect, view key and meta merged down its ancestor chain.
#[derive(Debug, Clone)]
pub struct RouteRecord {
    pub pattern: String,
    pub name: Option<String>,
    pub redirect: Option<String>,
    pub view: Option<String>,
    pub meta: RouteMeta,
    segments: Vec<Segment>,
}

impl RouteRecord {
    fn new(pattern: String, node: &RouteNode, meta: RouteMeta) -> Self {
        let segments = parse_pattern(&pattern);
        Self {
            pattern,
            name: node.name.clone(),
            redirect: node.redirect.clone(),
            view: node.view.clone(),
            meta,
            segments,
        }
    }

    /// Captured params on a match; `None` otherwise.
    fn capture(&self, path_segments: &[&str]) -> Option<Vec<(String, String)>> {
        let mut params = Vec::new();
        let mut idx = 0;
        for segment in &self.segments {
            match segment {
                Segment::Static(expected) => {
                    if path_segments.get(idx) != Some(&expected.as_str()) {
                        return None;
                    }
                    idx += 1;
                }
                Segment::Param(name) => {
                    let value = path_segments.get(idx)?;
                    params.push((name.clone(), (*value).to_string()));
                    idx += 1;
                }
                Segment::Tail(name) => {
                    params.push((name.clone(), path_segments[idx..].join("/")));
                    return Some(params);
                }
            }
        }
        (idx == path_segments.len()).then_some(params)
    }

    /// Higher ranks win: patterns without a tail beat catch-alls, then more
    /// static segments, then more segments overall.
    fn rank(&self) -> (bool, usize, usize) {
        let has_tail = self.segments.iter().any(|s| matches!(s, Segment::Tail(_)));
        let statics = self
            .segments
            .iter()
            .filter(|s| matches!(s, Segment::Static(_)))
            .count();
        (!has_tail, statics, self.segments.len())
    }
}

fn parse_pattern(pattern: &str) -> Vec<Segment> {
    pattern
        .split('/')
        .filter(|s| !s.is_empty())
        .map(|raw| match raw.strip_prefix(':') {
            Some(param) => {
                let name = param.split('(').next().unwrap_or(param).to_string();
                if param.contains("(.*)") {
                    Segment::Tail(name)
                } else {
                    Segment::Param(name)
                }
            }
            None => Segment::Static(raw.to_string()),
        })
        .collect()
}

/// ResolvedRoute
///
/// What a location resolved to. `pattern` is `None` when nothing matched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedRoute {
    pub path: String,
    pub full_path: String,
    #[schema(value_type = Vec<Vec<String>>)]
    pub query: Vec<(String, String)>,
    pub hash: String,
    pub name: Option<String>,
    pub pattern: Option<String>,
    pub redirect: Option<String>,
    pub view: Option<String>,
    #[schema(value_type = Vec<Vec<String>>)]
    pub params: Vec<(String, String)>,
    pub meta: RouteMeta,
}

impl ResolvedRoute {
    pub fn is_matched(&self) -> bool {
        self.pattern.is_some()
    }

    pub fn title(&self) -> Option<&str> {
        self.meta.title.as_deref()
    }
}

/// RouteMatcher
///
/// Compiled, immutable lookup over a route tree.
#[derive(Debug, Clone, Default)]
pub struct RouteMatcher {
    records: Vec<RouteRecord>,
}

impl RouteMatcher {
    pub fn new(routes: &[RouteNode]) -> Self {
        let mut records = Vec::new();
        compile(routes, "/", &RouteMeta::default(), &mut records);
        Self { records }
    }

    pub fn records(&self) -> &[RouteRecord] {
        &self.records
    }

    pub fn find_by_name(&self, name: &str) -> Option<&RouteRecord> {
        self.records
            .iter()
            .find(|record| record.name.as_deref() == Some(name))
    }

    pub fn resolve(&self, raw: &str) -> ResolvedRoute {
        let location = Location::parse(raw);
        let path_segments: Vec<&str> = location.path.split('/').filter(|s| !s.is_empty()).collect();

        let mut best: Option<(&RouteRecord, Vec<(String, String)>)> = None;
        for record in &self.records {
            let Some(params) = record.capture(&path_segments) else {
                continue;
            };
            let better = match &best {
                Some((current, _)) => record.rank() > current.rank(),
                None => true,
            };
            if better {
                best = Some((record, params));
            }
        }

        match best {
            Some((record, params)) => ResolvedRoute {
                path: location.path,
                full_path: location.full_path,
                query: location.query,
                hash: location.hash,
                name: record.name.clone(),
                pattern: Some(record.pattern.clone()),
                redirect: record.redirect.clone(),
                view: record.view.clone(),
                params,
                meta: record.meta.clone(),
            },
            None => ResolvedRoute {
                path: location.path,
                full_path: location.full_path,
                query: location.query,
                hash: location.hash,
                name: None,
                pattern: None,
                redirect: None,
                view: None,
                params: Vec::new(),
                meta: RouteMeta::default(),
            },
        }
    }
}

fn compile(nodes: &[RouteNode], parent: &str, parent_meta: &RouteMeta, out: &mut Vec<RouteRecord>) {
    for node in nodes {
        if node.is_external() {
            continue;
        }
        let pattern = join_path(parent, &node.path);
        let meta = node.meta.merged_over(parent_meta);
        out.push(RouteRecord::new(pattern.clone(), node, meta.clone()));
        if let Some(alias) = &node.alias {
            out.push(RouteRecord::new(join_path(parent, alias), node, meta.clone()));
        }
        compile(&node.children, &pattern, &meta, out);
    }
}

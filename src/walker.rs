//! Document walking - one stub per selected method.

use indexmap::map;
use tracing::{debug, trace};

use crate::document::{DiscoveryDocument, Method, Resource};
use crate::error::ResolveError;
use crate::filter::PathFilter;
use crate::resolver::resolve_ref;
use crate::types::{Direction, ResolveOptions, ValueTree};

/// Iterate every method of a document in declaration order: root methods
/// first, then each resource's own methods before its nested resources.
pub fn methods(document: &DiscoveryDocument) -> Methods<'_> {
    Methods {
        current: Some(document.methods.iter()),
        stack: vec![document.resources.values()],
    }
}

/// Depth-first iterator over `(method name, method)` pairs.
pub struct Methods<'a> {
    current: Option<map::Iter<'a, String, Method>>,
    stack: Vec<map::Values<'a, String, Resource>>,
}

impl<'a> Iterator for Methods<'a> {
    type Item = (&'a str, &'a Method);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(current) = &mut self.current {
                if let Some((name, method)) = current.next() {
                    return Some((name.as_str(), method));
                }
                self.current = None;
            }

            let resources = self.stack.last_mut()?;
            match resources.next() {
                Some(resource) => {
                    self.current = Some(resource.methods.iter());
                    self.stack.push(resource.resources.values());
                }
                None => {
                    self.stack.pop();
                }
            }
        }
    }
}

/// A method that passed the path filter, not yet resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectedMethod<'a> {
    /// Output directory relative to the stub root, e.g. `b/{bucket}/GET`.
    pub dir: String,
    pub name: &'a str,
    pub method: &'a Method,
}

/// Resolved artifacts for one method.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodStub<'a> {
    pub dir: String,
    pub name: &'a str,
    /// Verbatim method definition.
    pub method: &'a Method,
    /// `None` when the method declares no request schema.
    pub request: Option<Result<ValueTree, ResolveError>>,
    /// `None` when the method declares no response schema.
    pub response: Option<Result<ValueTree, ResolveError>>,
}

impl MethodStub<'_> {
    pub fn resolved(&self, direction: Direction) -> Option<&Result<ValueTree, ResolveError>> {
        match direction {
            Direction::Request => self.request.as_ref(),
            Direction::Response => self.response.as_ref(),
        }
    }

    /// Errors from either side, request first.
    pub fn errors(&self) -> impl Iterator<Item = (Direction, &ResolveError)> {
        [
            (Direction::Request, &self.request),
            (Direction::Response, &self.response),
        ]
        .into_iter()
        .filter_map(|(direction, resolved)| match resolved {
            Some(Err(e)) => Some((direction, e)),
            _ => None,
        })
    }
}

/// Walks a document, resolving request and response schemas per method.
///
/// Holds only borrows, so `iter` can be called any number of times and
/// every pass yields the same stubs.
#[derive(Debug, Clone, Copy)]
pub struct Walker<'a> {
    document: &'a DiscoveryDocument,
    filter: &'a PathFilter,
    request: &'a ResolveOptions,
    response: &'a ResolveOptions,
}

impl<'a> Walker<'a> {
    pub fn new(
        document: &'a DiscoveryDocument,
        filter: &'a PathFilter,
        request: &'a ResolveOptions,
        response: &'a ResolveOptions,
    ) -> Self {
        Self {
            document,
            filter,
            request,
            response,
        }
    }

    /// Methods with a path that the filter selects, without resolving them.
    pub fn selected(&self) -> impl Iterator<Item = SelectedMethod<'a>> + 'a {
        let filter = self.filter;
        methods(self.document).filter_map(move |(name, method)| {
            let Some(dir) = method.relative_dir() else {
                trace!(method = name, "skipping method without a path");
                return None;
            };
            filter
                .matches(&dir)
                .then_some(SelectedMethod { dir, name, method })
        })
    }

    /// Lazily resolve every selected method.
    pub fn iter(&self) -> impl Iterator<Item = MethodStub<'a>> + 'a {
        let walker = *self;
        self.selected().map(move |selected| walker.resolve(selected))
    }

    /// Resolve one selected method.
    pub fn resolve(&self, selected: SelectedMethod<'a>) -> MethodStub<'a> {
        debug!(dir = %selected.dir, "resolving method");
        let SelectedMethod { dir, name, method } = selected;

        MethodStub {
            request: self.resolve_side(method, self.request, Direction::Request),
            response: self.resolve_side(method, self.response, Direction::Response),
            dir,
            name,
            method,
        }
    }

    fn resolve_side(
        &self,
        method: &Method,
        options: &ResolveOptions,
        direction: Direction,
    ) -> Option<Result<ValueTree, ResolveError>> {
        let name = method.schema_ref(direction)?;
        Some(resolve_ref(&self.document.schemas, name, options))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::load_document_str;
    use crate::types::Limits;

    const DOC: &str = r#"{
        "schemas": {
            "Bucket": {
                "type": "object",
                "properties": { "id": { "type": "string" }, "owner": { "$ref": "Owner" } }
            },
            "Owner": {
                "type": "object",
                "properties": { "entity": { "type": "string" } }
            },
            "Broken": {
                "type": "object",
                "properties": { "ghost": { "$ref": "Ghost" } }
            }
        },
        "methods": {
            "getServiceAccount": { "path": "serviceAccount", "httpMethod": "GET" }
        },
        "resources": {
            "buckets": {
                "methods": {
                    "get": {
                        "path": "b/{bucket}",
                        "httpMethod": "GET",
                        "response": { "$ref": "Bucket" }
                    },
                    "insert": {
                        "path": "b",
                        "httpMethod": "POST",
                        "request": { "$ref": "Bucket" },
                        "response": { "$ref": "Broken" }
                    }
                },
                "resources": {
                    "acl": {
                        "methods": {
                            "list": { "path": "b/{bucket}/acl", "httpMethod": "GET" }
                        }
                    }
                }
            },
            "objects": {
                "methods": {
                    "watch": { "httpMethod": "POST" },
                    "delete": { "path": "b/{bucket}/o/{object}", "httpMethod": "DELETE" }
                }
            }
        }
    }"#;

    fn fixture() -> (DiscoveryDocument, ResolveOptions, ResolveOptions) {
        (
            load_document_str(DOC).unwrap(),
            ResolveOptions::new(Direction::Request),
            ResolveOptions::new(Direction::Response),
        )
    }

    #[test]
    fn methods_in_declaration_order() {
        let (doc, _, _) = fixture();
        let names: Vec<_> = methods(&doc).map(|(name, _)| name).collect();
        assert_eq!(
            names,
            ["getServiceAccount", "get", "insert", "list", "watch", "delete"]
        );
    }

    #[test]
    fn methods_of_empty_document() {
        let doc = DiscoveryDocument::default();
        assert_eq!(methods(&doc).count(), 0);
    }

    #[test]
    fn pathless_methods_are_skipped() {
        let (doc, req, resp) = fixture();
        let filter = PathFilter::default();
        let walker = Walker::new(&doc, &filter, &req, &resp);

        let dirs: Vec<_> = walker.selected().map(|s| s.dir).collect();
        assert_eq!(
            dirs,
            [
                "serviceAccount/GET",
                "b/{bucket}/GET",
                "b/POST",
                "b/{bucket}/acl/GET",
                "b/{bucket}/o/{object}/DELETE"
            ]
        );
    }

    #[test]
    fn filter_excludes_methods() {
        let (doc, req, resp) = fixture();
        let filter = PathFilter::new("acl|DELETE").unwrap();
        let walker = Walker::new(&doc, &filter, &req, &resp);

        let names: Vec<_> = walker.iter().map(|stub| stub.name).collect();
        assert_eq!(names, ["list", "delete"]);
    }

    #[test]
    fn stubs_resolve_each_side() {
        let (doc, req, resp) = fixture();
        let filter = PathFilter::default();
        let walker = Walker::new(&doc, &filter, &req, &resp);
        let stubs: Vec<_> = walker.iter().collect();

        let get = &stubs[1];
        assert!(get.request.is_none());
        let response = get.response.as_ref().unwrap().as_ref().unwrap();
        assert_eq!(
            response.to_json(),
            serde_json::json!({"id": "<string>", "owner": {"entity": "<string>"}})
        );
        assert_eq!(get.method.raw["httpMethod"], "GET");

        let list = &stubs[3];
        assert!(list.request.is_none());
        assert!(list.response.is_none());
        assert_eq!(list.errors().count(), 0);
    }

    #[test]
    fn dangling_reference_affects_one_side_only() {
        let (doc, req, resp) = fixture();
        let filter = PathFilter::new("^b/POST$").unwrap();
        let walker = Walker::new(&doc, &filter, &req, &resp);

        let stubs: Vec<_> = walker.iter().collect();
        assert_eq!(stubs.len(), 1);
        let insert = &stubs[0];
        assert!(matches!(insert.request, Some(Ok(_))));
        assert_eq!(
            insert.response,
            Some(Err(ResolveError::DanglingRef {
                name: "Ghost".into()
            }))
        );

        let errors: Vec<_> = insert.errors().collect();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].0, Direction::Response);
    }

    #[test]
    fn streams_use_their_own_limits() {
        let (doc, _, _) = fixture();
        let shallow = Limits {
            max_depth: 1,
            ..Limits::default()
        };
        let req = ResolveOptions::new(Direction::Request).limits(shallow);
        let resp = ResolveOptions::new(Direction::Response);
        let filter = PathFilter::new("^b/POST$").unwrap();
        let walker = Walker::new(&doc, &filter, &req, &resp);

        let stub = walker.iter().next().unwrap();
        let request = stub.request.unwrap().unwrap();
        assert_eq!(
            request.get("owner").and_then(ValueTree::as_leaf),
            Some("(1 properties hidden: max recursion exceeded)")
        );
    }

    #[test]
    fn iteration_is_restartable() {
        let (doc, req, resp) = fixture();
        let filter = PathFilter::default();
        let walker = Walker::new(&doc, &filter, &req, &resp);

        let first: Vec<_> = walker.iter().collect();
        let second: Vec<_> = walker.iter().collect();
        assert_eq!(first, second);
    }
}

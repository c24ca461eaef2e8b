use std::collections::HashMap;
use std::rc::Rc;

use log::{debug, error};

use crate::error::Result;
use crate::object::{Object, Operation, Request, Response, TypeKey};

pub trait Handler {
    fn get(&self, filter: &Object, out: &mut Vec<Object>) -> Result<()>;

    /// Apply a create, set or delete. Attributes the framework should
    /// persist (such as a new ifindex) are written back into `change`.
    fn transact(&self, operation: Operation, change: &mut Object) -> Result<()>;
}

#[derive(Default)]
pub struct Router {
    routes: HashMap<TypeKey, Rc<dyn Handler>>,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(mut self, keys: &[TypeKey], handler: Rc<dyn Handler>) -> Self {
        for key in keys {
            self.routes.insert(*key, handler.clone());
        }
        self
    }

    pub fn keys(&self) -> Vec<TypeKey> {
        let mut keys: Vec<TypeKey> = self.routes.keys().copied().collect();
        keys.sort_by_key(|k| k.as_str());
        keys
    }

    pub fn dispatch(&self, request: Request) -> Response {
        let Request {
            operation,
            mut object,
        } = request;
        let Some(handler) = self.routes.get(&object.key) else {
            return failure(format!("no handler registered for {}", object.key));
        };
        debug!("{} {}: {:?}", operation, object.key, object.attrs);

        match operation {
            Operation::Get => {
                let mut objects = Vec::new();
                match handler.get(&object, &mut objects) {
                    Ok(()) => Response {
                        success: true,
                        objects,
                        ..Default::default()
                    },
                    Err(e) => {
                        error!("get on {} failed: {}", object.key, e);
                        failure(e.to_string())
                    }
                }
            }
            _ => match handler.transact(operation, &mut object) {
                Ok(()) => Response {
                    success: true,
                    change: Some(object),
                    ..Default::default()
                },
                Err(e) => {
                    error!("{} on {} failed: {}", operation, object.key, e);
                    Response {
                        change: Some(object),
                        ..failure(e.to_string())
                    }
                }
            },
        }
    }
}

fn failure(message: String) -> Response {
    Response {
        success: false,
        error: Some(message),
        ..Default::default()
    }
}

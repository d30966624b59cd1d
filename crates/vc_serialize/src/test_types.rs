//! Types shared by the unit tests.

use alloc::boxed::Box;
use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;
use core::any::Any;

use vc_utils::hash::HashSet;

use crate::interfaces::EventHandler;
use crate::{SerializeContext, impl_type_info};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    #[default]
    Box = 0,
    Sphere = 1,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Base {
    pub x: i32,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Derived {
    pub base: Base,
    pub y: i32,
    pub shape: Shape,
    pub values: Vec<i32>,
}

#[derive(Default)]
pub struct Holder {
    pub boxed: Option<Box<Base>>,
    pub dynamic: Option<Box<dyn Any>>,
    pub list: Vec<Shape>,
    pub names: BTreeMap<u32, String>,
    pub tags: HashSet<u32>,
    pub empty: Option<Box<Base>>,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Tagged {
    pub value: i32,
    pub cloned: u32,
}

struct TaggedEvents;

impl EventHandler for TaggedEvents {
    fn on_object_cloned(&self, instance: &mut dyn Any) {
        if let Some(tagged) = instance.downcast_mut::<Tagged>() {
            tagged.cloned += 1;
        }
    }

    fn on_loaded_from_object_stream(&self, instance: &mut dyn Any) {
        if let Some(tagged) = instance.downcast_mut::<Tagged>() {
            tagged.value += 1000;
        }
    }
}

impl_type_info!(Shape, "Shape", 0x5e0c44f1_3f6a_4c1e_8d55_0a4f6c2b9e10);
impl_type_info!(Base, "Base", 0x5e0c44f1_3f6a_4c1e_8d55_0a4f6c2b9e11);
impl_type_info!(Derived, "Derived", 0x5e0c44f1_3f6a_4c1e_8d55_0a4f6c2b9e12);
impl_type_info!(Holder, "Holder", 0x5e0c44f1_3f6a_4c1e_8d55_0a4f6c2b9e13);
impl_type_info!(Tagged, "Tagged", 0x5e0c44f1_3f6a_4c1e_8d55_0a4f6c2b9e14);

pub fn reflect_all(sc: &mut SerializeContext) {
    sc.enumeration::<Shape, u8>(|shape| shape as u8)
        .value("Box", Shape::Box)
        .value("Sphere", Shape::Sphere);

    sc.class::<Base>()
        .field("x", |b| &b.x, |b| &mut b.x);

    sc.class::<Derived>()
        .base(|d| &d.base, |d| &mut d.base)
        .field("y", |d| &d.y, |d| &mut d.y)
        .field("shape", |d| &d.shape, |d| &mut d.shape)
        .field("values", |d| &d.values, |d| &mut d.values);

    sc.class::<Holder>()
        .boxed_field("boxed", |h| &h.boxed, |h| &mut h.boxed)
        .dyn_field("dynamic", |h| &h.dynamic, |h| &mut h.dynamic)
        .field("list", |h| &h.list, |h| &mut h.list)
        .field("names", |h| &h.names, |h| &mut h.names)
        .field("tags", |h| &h.tags, |h| &mut h.tags)
        .boxed_field("empty", |h| &h.empty, |h| &mut h.empty);

    sc.class::<Tagged>()
        .event_handler(TaggedEvents)
        .field("value", |t| &t.value, |t| &mut t.value);
}

// MIT License
//
// Copyright (c) 2019-2021 Tobias Pfeiffer
//
// Permission is hereby granted, free of charge, to any person obtaining a copy
// of this software and associated documentation files (the "Software"), to deal
// in the Software without restriction, including without limitation the rights
// to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
// copies of the Software, and to permit persons to whom the Software is
// furnished to do so, subject to the following conditions:
//
// The above copyright notice and this permission notice shall be included in all
// copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
// IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
// FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
// AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
// LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
// OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
// SOFTWARE.

//! The registry as a graph of named nodes, each node depending on its parents.

use {
	crate::{error::{Error, Result}, parse::*},
	std::collections::{HashMap, HashSet}
};

pub type NodeId = usize;

/// Base value of enums defined by extensions.
pub const EXT_ENUM_BASE: i64 = 1_000_000_000;
/// Number of enum values reserved for each extension.
pub const EXT_ENUM_RANGE: i64 = 1_000;

const CONSTANTS: &str = "API Constants";

/// Node kinds, in the order siblings are traversed.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum NodeKind {
	Platform,
	Type,
	Enums,
	Enum,
	Command,
	Feature,
	Extension,
	Virtual
}

/// The attributes of an `<enums>` block, its values are the parents of its node.
#[derive(Debug, Clone)]
pub struct EnumsInfo {
	pub name:      String,
	pub kind:      EnumsType,
	pub bit_width: Option<u32>,
	pub comment:   Option<String>
}

#[derive(Debug, Clone)]
pub enum Element {
	Platform(PlatformElement),
	Type(TypeElement),
	Enums(EnumsInfo),
	Enum(EnumElement),
	Command(CommandElement),
	Feature(FeatureElement),
	Extension(ExtensionElement),
	Virtual(String)
}

impl Element {
	pub fn kind(&self) -> NodeKind {
		match self {
			Self::Platform(_)  => NodeKind::Platform,
			Self::Type(_)      => NodeKind::Type,
			Self::Enums(_)     => NodeKind::Enums,
			Self::Enum(_)      => NodeKind::Enum,
			Self::Command(_)   => NodeKind::Command,
			Self::Feature(_)   => NodeKind::Feature,
			Self::Extension(_) => NodeKind::Extension,
			Self::Virtual(_)   => NodeKind::Virtual
		}
	}

	pub fn name(&self) -> &str {
		match self {
			Self::Platform(v)  => &v.name,
			Self::Type(v)      => &v.name,
			Self::Enums(v)     => &v.name,
			Self::Enum(v)      => &v.name,
			Self::Command(v)   => v.name(),
			Self::Feature(v)   => &v.name,
			Self::Extension(v) => &v.name,
			Self::Virtual(v)   => v
		}
	}

	/// Commands, features and extensions are never equal.
	fn same_definition(&self, other: &Self) -> bool {
		match (self, other) {
			(Self::Platform(a), Self::Platform(b)) => a == b,
			(Self::Type(a), Self::Type(b)) => a.same_definition(b),
			(Self::Enum(a), Self::Enum(b)) => a.same_definition(b),
			_ => false
		}
	}
}

#[derive(Debug, Clone)]
pub struct RegistryNode {
	pub element:         Element,
	pub parents:         Vec<NodeId>,
	/// Referenced names without a definition.
	pub missing_parents: Vec<String>
}

impl RegistryNode {
	fn new(element: Element) -> Self {
		Self { element, parents: Vec::new(), missing_parents: Vec::new() }
	}

	pub fn kind(&self) -> NodeKind {
		self.element.kind()
	}

	pub fn name(&self) -> &str {
		self.element.name()
	}

	/// The parents of terminal nodes are part of the node itself and are not traversed.
	pub fn is_terminal(&self) -> bool {
		matches!(&self.element, Element::Type(v) if v.category.is_terminal())
	}

	pub fn as_type(&self) -> Option<&TypeElement> {
		match &self.element { Element::Type(v) => Some(v), _ => None }
	}

	pub fn as_enums(&self) -> Option<&EnumsInfo> {
		match &self.element { Element::Enums(v) => Some(v), _ => None }
	}

	pub fn as_enum(&self) -> Option<&EnumElement> {
		match &self.element { Element::Enum(v) => Some(v), _ => None }
	}

	pub fn as_command(&self) -> Option<&CommandElement> {
		match &self.element { Element::Command(v) => Some(v), _ => None }
	}

	pub fn as_feature(&self) -> Option<&FeatureElement> {
		match &self.element { Element::Feature(v) => Some(v), _ => None }
	}

	pub fn as_extension(&self) -> Option<&ExtensionElement> {
		match &self.element { Element::Extension(v) => Some(v), _ => None }
	}

	fn order(&self) -> (NodeKind, u32) {
		(self.kind(), self.as_type().map_or(0, |v| v.category.order()))
	}
}

#[derive(Debug, Clone)]
pub struct RegistryGraph {
	nodes:      Vec<RegistryNode>,
	dictionary: HashMap<String, NodeId>,
	constants:  NodeId,
	enabled:    HashSet<String>
}

impl RegistryGraph {
	/// Creates one node per named element, without any edges.
	pub fn generate_nodes(registry: &Registry) -> Result<Self> {
		let mut graph = Self {
			nodes:      Vec::new(),
			dictionary: HashMap::new(),
			constants:  0,
			enabled:    HashSet::new()
		};
		graph.constants = graph.push(Element::Virtual(CONSTANTS.to_string()));

		for v in &registry.platforms {
			graph.define(Element::Platform(v.clone()))?;
		}

		for v in &registry.types {
			graph.define(Element::Type(v.clone()))?;
		}

		for v in registry.enums.iter().flat_map(|v| v.enums.iter()) {
			graph.define(Element::Enum(v.clone()))?;
		}

		for v in &registry.commands {
			graph.define(Element::Command(v.clone()))?;
		}

		for v in &registry.features {
			graph.define(Element::Feature(v.clone()))?;
			graph.define_require_enums(&v.require)?;
		}

		for v in &registry.extensions {
			graph.define(Element::Extension(v.clone()))?;
			graph.define_require_enums(&v.require)?;
		}

		log::debug!("defined {} names", graph.dictionary.len());
		Ok(graph)
	}

	/// Builds the graph and links every reference of the registry, `enabled`
	/// decides which conditional require blocks and alternatives are followed.
	pub fn build(registry: &Registry, enabled: &[&str]) -> Result<Self> {
		let mut graph = Self::generate_nodes(registry)?;
		graph.enabled = enabled.iter().map(|v| v.to_string()).collect();

		for ty in &registry.types {
			let id = match graph.lookup(&ty.name) {
				Some(id) => id,
				None => continue
			};

			let mut names = Vec::new();
			names.extend(ty.requires.as_deref());
			names.extend(ty.alias.as_deref());
			names.extend(ty.parents());
			for member in &ty.members {
				names.push(member.type_name.as_str());
				names.extend(member.enum_ref.as_deref());
			}
			names.extend(ty.obj_type_enum.as_deref());
			names.extend(ty.type_tags.iter().map(String::as_str));

			for name in names {
				graph.link(id, name);
			}
		}

		for enums in &registry.enums {
			let id = graph.push(Element::Enums(EnumsInfo {
				name:      enums.name.clone(),
				kind:      enums.kind,
				bit_width: enums.bit_width,
				comment:   enums.comment.clone()
			}));

			let owner = graph.lookup(&enums.name).unwrap_or(graph.constants);
			graph.add_parent(owner, id);

			for value in &enums.enums {
				graph.link(id, &value.name);
				if let (Some(value_id), Some(alias)) = (graph.lookup(&value.name), &value.alias) {
					graph.link(value_id, alias);
				}
			}
		}

		for command in &registry.commands {
			let id = match graph.lookup(command.name()) {
				Some(id) => id,
				None => continue
			};

			if let Some(alias) = &command.alias {
				graph.link(id, alias);
			}

			graph.link(id, &command.proto.type_name);
			for param in &command.params {
				graph.link(id, &param.type_name);
			}
		}

		for feature in &registry.features {
			if let Some(id) = graph.lookup(&feature.name) {
				graph.link_require(id, &feature.require);
			}
		}

		for ext in &registry.extensions {
			let id = match graph.lookup(&ext.name) {
				Some(id) => id,
				None => continue
			};

			graph.link_require(id, &ext.require);
			if let Some(platform) = &ext.platform {
				graph.link(id, platform);
			}

			if let Some(depends) = &ext.depends {
				graph.link_depends(id, depends);
			}
		}

		log::debug!("built graph with {} nodes", graph.nodes.len());
		Ok(graph)
	}

	/// Adds the enums of the feature's require blocks to the enums blocks they extend.
	pub fn apply_feature(&mut self, name: &str) {
		let require = match self.get(name).and_then(RegistryNode::as_feature) {
			Some(feature) => feature.require.clone(),
			None => {
				log::warn!("unknown feature `{}`", name);
				return;
			}
		};

		for require in &require {
			if self.is_satisfied(&require.depends) {
				self.apply_require(require, None);
			}
		}
	}

	/// Adds the enums of the extension's require blocks to the enums blocks they extend.
	pub fn apply_extension(&mut self, name: &str) {
		let (require, number) = match self.get(name).and_then(RegistryNode::as_extension) {
			Some(ext) => (ext.require.clone(), ext.number),
			None => {
				log::warn!("unknown extension `{}`", name);
				return;
			}
		};

		for require in &require {
			if self.is_satisfied(&require.depends) {
				self.apply_require(require, Some(number));
			}
		}
	}

	/// Calls `collect` with the path to every node reachable from `starts`, after
	/// all of the node's parents. Each node is collected at most once.
	pub fn depth_first_search(&self, starts: &[NodeId], mut collect: impl FnMut(&[NodeId])) {
		let mut tracked = vec![false; self.nodes.len()];
		let mut starts = starts.to_vec();
		self.sort(&mut starts);

		let mut stack = starts.into_iter()
			.rev()
			.map(|id| vec![id])
			.collect::<Vec<_>>();

		while let Some(path) = stack.pop() {
			let current = match path.last() {
				Some(&id) if !tracked[id] => id,
				_ => continue
			};

			let node = &self.nodes[current];
			let mut unvisited = match node.is_terminal() {
				true => Vec::new(),
				false => node.parents.iter()
					.copied()
					.filter(|id| !tracked[*id] && !path.contains(id))
					.collect::<Vec<_>>()
			};

			if unvisited.is_empty() {
				collect(&path);
				tracked[current] = true;
				continue;
			}

			self.sort(&mut unvisited);
			let children = unvisited.iter()
				.rev()
				.map(|id| {
					let mut next = path.clone();
					next.push(*id);
					next
				})
				.collect::<Vec<_>>();

			stack.push(path);
			stack.extend(children);
		}
	}

	/// Every node reachable from the named features and extensions, dependencies first.
	pub fn emission_order(&self, starts: &[&str]) -> Vec<NodeId> {
		let starts = starts.iter()
			.filter_map(|name| {
				let id = self.lookup(name);
				if id.is_none() {
					log::warn!("`{}` is not defined in the registry", name);
				}
				id
			})
			.collect::<Vec<_>>();

		let mut order = Vec::new();
		self.depth_first_search(&starts, |path| order.extend(path.last().copied()));
		log::debug!("{} of {} nodes are reachable", order.len(), self.nodes.len());
		order
	}

	pub fn lookup(&self, name: &str) -> Option<NodeId> {
		self.dictionary.get(name).copied()
	}

	pub fn get(&self, name: &str) -> Option<&RegistryNode> {
		self.lookup(name).map(|id| &self.nodes[id])
	}

	pub fn node(&self, id: NodeId) -> &RegistryNode {
		&self.nodes[id]
	}

	pub fn len(&self) -> usize {
		self.nodes.len()
	}

	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}

	/// The virtual node owning every enums block without a type of the same name.
	pub fn constants(&self) -> NodeId {
		self.constants
	}

	pub fn is_enabled(&self, name: &str) -> bool {
		self.enabled.contains(name)
	}

	/// The enums blocks of a type.
	pub fn enums_parents(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
		self.parents_of_kind(id, NodeKind::Enums)
	}

	/// The values of an enums block.
	pub fn enum_parents(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
		self.parents_of_kind(id, NodeKind::Enum)
	}

	fn parents_of_kind(&self, id: NodeId, kind: NodeKind) -> impl Iterator<Item = NodeId> + '_ {
		self.nodes[id].parents.iter()
			.copied()
			.filter(move |id| self.nodes[*id].kind() == kind)
	}

	fn push(&mut self, element: Element) -> NodeId {
		self.nodes.push(RegistryNode::new(element));
		self.nodes.len() - 1
	}

	fn define(&mut self, element: Element) -> Result<()> {
		match self.lookup(element.name()) {
			Some(id) if self.nodes[id].element.same_definition(&element) => {
				log::trace!("`{}` is defined again with the same definition", element.name());
				Ok(())
			}
			Some(_) => Err(Error::Redefined(element.name().to_string())),
			None => {
				let name = element.name().to_string();
				let id = self.push(element);
				self.dictionary.insert(name, id);
				Ok(())
			}
		}
	}

	fn define_require_enums(&mut self, require: &[RequireElement]) -> Result<()> {
		for e in require.iter().flat_map(|v| v.enums.iter()).filter(|v| !v.is_reference()) {
			self.define(Element::Enum(e.element.clone()))?;
		}
		Ok(())
	}

	fn add_parent(&mut self, child: NodeId, parent: NodeId) {
		let parents = &mut self.nodes[child].parents;
		if child != parent && !parents.contains(&parent) {
			parents.push(parent);
		}
	}

	/// Adds the node named `name` as a parent of `child`, or records the name as missing.
	fn link(&mut self, child: NodeId, name: &str) {
		let name = name.trim();
		if name.is_empty() {
			return;
		}

		match self.lookup(name) {
			Some(parent) => self.add_parent(child, parent),
			None => {
				let missing = &mut self.nodes[child].missing_parents;
				if !missing.iter().any(|v| v == name) {
					missing.push(name.to_string());
				}
			}
		}
	}

	fn link_require(&mut self, id: NodeId, require: &[RequireElement]) {
		for require in require {
			if !self.is_satisfied(&require.depends) {
				continue;
			}

			for name in require.commands.iter().chain(require.types.iter()) {
				self.link(id, name);
			}

			for e in &require.enums {
				if let Some(extends) = &e.extends {
					self.link(id, extends);
				}
				self.link(id, e.name());
			}
		}
	}

	fn link_depends(&mut self, id: NodeId, depends: &str) {
		let (any, all) = (depends.contains(','), depends.contains('+'));
		if (any && all) || depends.contains('(') || depends.contains(')') {
			log::info!("`{}`: dependency `{}` is too complex to link", self.nodes[id].name(), depends);
		} else if any {
			let name = depends.split(',')
				.map(str::trim)
				.filter(|v| self.enabled.contains(*v))
				.last();

			if let Some(name) = name {
				self.link(id, name);
			}
		} else {
			for name in depends.split('+') {
				self.link(id, name);
			}
		}
	}

	fn is_satisfied(&self, depends: &Option<String>) -> bool {
		depends.as_deref().map_or(true, |v| depends_satisfied(v, &self.enabled))
	}

	fn apply_require(&mut self, require: &RequireElement, ext_number: Option<u32>) {
		for e in &require.enums {
			let block = match &e.extends {
				Some(extends) => match self.lookup(extends).and_then(|id| self.enums_parents(id).next()) {
					Some(block) => block,
					None => {
						log::warn!("`{}` extends `{}`, which has no enums block", e.name(), extends);
						continue;
					}
				},
				None if e.element.value.is_some() => match self.enums_parents(self.constants).next() {
					Some(block) => block,
					None => {
						log::warn!("there is no constants block for `{}`", e.name());
						continue;
					}
				},
				None => continue
			};

			let mut element = e.element.clone();
			let bitmask = matches!(self.nodes[block].as_enums(), Some(v) if v.kind == EnumsType::Bitmask);
			if e.extends.is_some() && !bitmask && element.alias.is_none() && element.value.is_none() {
				match (e.ext_number.or(ext_number), e.offset) {
					(Some(number), Some(offset)) => element.value = Some(
						extension_enum_value(number, offset, e.dir.as_deref() == Some("-")).to_string()),
					_ => {
						log::warn!("the value of `{}` cannot be computed", e.name());
						continue;
					}
				}
			}

			self.add_enum(block, element);
		}
	}

	fn add_enum(&mut self, block: NodeId, element: EnumElement) {
		if self.enum_parents(block).any(|id| self.nodes[id].name() == element.name) {
			log::trace!("`{}` was already added to `{}`", element.name, self.nodes[block].name());
			return;
		}

		let id = self.push(Element::Enum(element));
		self.add_parent(block, id);
	}

	fn sort(&self, ids: &mut [NodeId]) {
		ids.sort_by_key(|id| self.nodes[*id].order());
	}
}

/// The value of an enum defined by the extension `ext_number`.
pub fn extension_enum_value(ext_number: u32, offset: u32, negative: bool) -> i64 {
	let value = EXT_ENUM_BASE + (i64::from(ext_number) - 1) * EXT_ENUM_RANGE + i64::from(offset);
	if negative { -value } else { value }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
enum Token<'a> {
	Name(&'a str),
	And,
	Or,
	Open,
	Close
}

fn tokenize(expr: &str) -> Vec<Token> {
	let mut tokens = Vec::new();
	let mut start = None;

	for (i, c) in expr.char_indices() {
		let token = match c {
			'+' => Token::And,
			',' => Token::Or,
			'(' => Token::Open,
			')' => Token::Close,
			_ => {
				start.get_or_insert(i);
				continue;
			}
		};

		if let Some(start) = start.take() {
			tokens.push(Token::Name(expr[start..i].trim()));
		}
		tokens.push(token);
	}

	if let Some(start) = start {
		tokens.push(Token::Name(expr[start..].trim()));
	}

	tokens
}

/// Evaluates a dependency expression, `+` is a conjunction, `,` a disjunction,
/// both evaluated left to right unless grouped by parentheses.
pub fn depends_satisfied(expr: &str, enabled: &HashSet<String>) -> bool {
	fn sequence(tokens: &[Token], pos: &mut usize, enabled: &HashSet<String>) -> bool {
		let mut value = term(tokens, pos, enabled);
		while let Some(op) = tokens.get(*pos).copied() {
			if op != Token::And && op != Token::Or {
				break;
			}

			*pos += 1;
			let rhs = term(tokens, pos, enabled);
			value = match op {
				Token::And => value && rhs,
				_ => value || rhs
			};
		}
		value
	}

	fn term(tokens: &[Token], pos: &mut usize, enabled: &HashSet<String>) -> bool {
		match tokens.get(*pos).copied() {
			Some(Token::Open) => {
				*pos += 1;
				let value = sequence(tokens, pos, enabled);
				if tokens.get(*pos) == Some(&Token::Close) {
					*pos += 1;
				}
				value
			}
			Some(Token::Name(name)) => {
				*pos += 1;
				enabled.contains(name)
			}
			_ => false
		}
	}

	let tokens = tokenize(expr);
	sequence(&tokens, &mut 0, enabled)
}

#[cfg(test)]
mod tests {
	use {super::*, crate::xml};

	const ENABLED: &[&str] = &[
		"VK_VERSION_1_0",
		"VK_VERSION_1_1",
		"VK_KHR_surface",
		"VK_KHR_swapchain",
		"VK_KHR_get_physical_device_properties2"
	];

	fn registry() -> Registry {
		xml::deserialize::<Registry, _>(include_str!("../tests/data/mini_vk.xml").as_bytes())
			.unwrap()
			.for_api("vulkan")
	}

	fn graph() -> RegistryGraph {
		let mut graph = RegistryGraph::build(&registry(), ENABLED).unwrap();
		graph.apply_feature("VK_VERSION_1_0");
		graph.apply_feature("VK_VERSION_1_1");
		graph.apply_extension("VK_KHR_surface");
		graph.apply_extension("VK_KHR_swapchain");
		graph.apply_extension("VK_KHR_get_physical_device_properties2");
		graph
	}

	fn id(graph: &RegistryGraph, name: &str) -> NodeId {
		graph.lookup(name).unwrap_or_else(|| panic!("`{}` is not defined", name))
	}

	fn has_parent(graph: &RegistryGraph, child: &str, parent: &str) -> bool {
		graph.node(id(graph, child)).parents.contains(&id(graph, parent))
	}

	fn values<'a>(graph: &'a RegistryGraph, owner: NodeId) -> Vec<&'a EnumElement> {
		graph.enums_parents(owner)
			.flat_map(|block| graph.enum_parents(block))
			.filter_map(|id| graph.node(id).as_enum())
			.collect()
	}

	fn value<'a>(graph: &'a RegistryGraph, ty: &str, name: &str) -> Option<&'a EnumElement> {
		values(graph, id(graph, ty)).into_iter().find(|v| v.name == name)
	}

	#[test]
	fn defines_every_named_element() {
		let graph = graph();
		assert_eq!(graph.get("xlib").unwrap().kind(), NodeKind::Platform);
		assert_eq!(graph.get("VkInstance").unwrap().kind(), NodeKind::Type);
		assert_eq!(graph.get("VK_SUCCESS").unwrap().kind(), NodeKind::Enum);
		assert_eq!(graph.get("VK_LOD_CLAMP_NONE").unwrap().kind(), NodeKind::Enum);
		assert_eq!(graph.get("vkGetPhysicalDeviceProperties2KHR").unwrap().kind(), NodeKind::Command);
		assert_eq!(graph.get("VK_VERSION_1_0").unwrap().kind(), NodeKind::Feature);
		assert_eq!(graph.get("VK_KHR_surface").unwrap().kind(), NodeKind::Extension);
		assert_eq!(graph.get("VK_KHR_SURFACE_SPEC_VERSION").unwrap().kind(), NodeKind::Enum);
		assert!(graph.get("VK_NV_disabled").is_none());
		assert!(graph.get("VkResult").unwrap().is_terminal());
		assert!(!graph.get("VkDevice").unwrap().is_terminal());
	}

	#[test]
	fn links_types_and_commands() {
		let graph = graph();
		assert!(has_parent(&graph, "VkDevice", "VkPhysicalDevice"));
		assert!(has_parent(&graph, "VkDevice", "VK_DEFINE_HANDLE"));
		assert!(has_parent(&graph, "VkSwapchainKHR", "VkSurfaceKHR"));
		assert!(has_parent(&graph, "VkSwapchainKHR", "VkDevice"));
		assert!(has_parent(&graph, "VkQueueFlags", "VkQueueFlagBits"));
		assert!(has_parent(&graph, "VkPhysicalDeviceProperties", "VK_MAX_PHYSICAL_DEVICE_NAME_SIZE"));
		assert!(has_parent(&graph, "VkPhysicalDeviceProperties2KHR", "VkPhysicalDeviceProperties2"));
		assert!(has_parent(&graph, "vkCreateDevice", "VkResult"));
		assert!(has_parent(&graph, "vkCreateDevice", "VkDeviceCreateInfo"));
		assert!(has_parent(&graph, "vkGetPhysicalDeviceProperties2KHR", "vkGetPhysicalDeviceProperties2"));
		assert!(has_parent(&graph, "VK_LUID_SIZE_KHR", "VK_LUID_SIZE"));

		let instance = graph.get("VkInstance").unwrap();
		assert_eq!(instance.missing_parents, vec!["VK_OBJECT_TYPE_INSTANCE"]);
	}

	#[test]
	fn links_satisfied_require_blocks() {
		let graph = graph();
		assert!(has_parent(&graph, "VK_VERSION_1_0", "vkCreateInstance"));
		assert!(has_parent(&graph, "VK_VERSION_1_1", "VkResult"));
		assert!(has_parent(&graph, "VK_VERSION_1_1", "VK_ERROR_OUT_OF_POOL_MEMORY"));
		assert!(has_parent(&graph, "VK_KHR_swapchain", "VK_STRUCTURE_TYPE_DEVICE_GROUP_PRESENT_CAPABILITIES_KHR"));
		assert!(!has_parent(&graph, "VK_KHR_swapchain", "VK_STRUCTURE_TYPE_DEVICE_GROUP_SWAPCHAIN_CREATE_INFO_KHR"));
	}

	#[test]
	fn attaches_enums_blocks() {
		let graph = graph();
		assert_eq!(graph.enums_parents(id(&graph, "VkResult")).count(), 1);
		assert_eq!(graph.enums_parents(graph.constants()).count(), 1);
		assert_eq!(graph.enums_parents(id(&graph, "VkDevice")).count(), 0);

		let constants = values(&graph, graph.constants());
		assert_eq!(constants[0].name, "VK_MAX_PHYSICAL_DEVICE_NAME_SIZE");
		assert!(constants.iter().any(|v| v.name == "VK_KHR_SURFACE_SPEC_VERSION" && v.value.as_deref() == Some("25")));
		assert!(constants.iter().any(|v| v.name == "VK_MAX_DEVICE_GROUP_SIZE" && v.value.as_deref() == Some("32")));
		assert!(!constants.iter().any(|v| v.name == "VK_KHR_XLIB_SURFACE_SPEC_VERSION"));
	}

	#[test]
	fn computes_extension_enum_values() {
		let graph = graph();
		let computed = |ty: &str, name: &str| value(&graph, ty, name).and_then(|v| v.value.clone());

		assert_eq!(computed("VkResult", "VK_SUCCESS").as_deref(), Some("0"));
		assert_eq!(computed("VkResult", "VK_ERROR_OUT_OF_POOL_MEMORY").as_deref(), Some("-1000069000"));
		assert_eq!(computed("VkResult", "VK_ERROR_SURFACE_LOST_KHR").as_deref(), Some("-1000000000"));
		assert_eq!(computed("VkResult", "VK_SUBOPTIMAL_KHR").as_deref(), Some("1000001003"));
		assert_eq!(computed("VkStructureType", "VK_STRUCTURE_TYPE_PHYSICAL_DEVICE_PROPERTIES_2").as_deref(), Some("1000059001"));
		assert_eq!(computed("VkStructureType", "VK_STRUCTURE_TYPE_DEVICE_GROUP_PRESENT_CAPABILITIES_KHR").as_deref(), Some("1000060007"));
		assert_eq!(computed("VkStructureType", "VK_STRUCTURE_TYPE_DEVICE_GROUP_SWAPCHAIN_CREATE_INFO_KHR"), None);
	}

	#[test]
	fn keeps_aliases_and_bit_positions() {
		let graph = graph();
		let alias = value(&graph, "VkStructureType", "VK_STRUCTURE_TYPE_PHYSICAL_DEVICE_PROPERTIES_2_KHR").unwrap();
		assert_eq!(alias.value, None);
		assert_eq!(alias.alias.as_deref(), Some("VK_STRUCTURE_TYPE_PHYSICAL_DEVICE_PROPERTIES_2"));

		let protected = value(&graph, "VkQueueFlagBits", "VK_QUEUE_PROTECTED_BIT").unwrap();
		assert_eq!(protected.bit_pos, Some(4));
		assert_eq!(protected.value, None);

		let count = values(&graph, id(&graph, "VkStructureType")).iter()
			.filter(|v| v.name == "VK_STRUCTURE_TYPE_PHYSICAL_DEVICE_PROPERTIES_2")
			.count();
		assert_eq!(count, 1);
	}

	#[test]
	fn computes_offsets() {
		assert_eq!(extension_enum_value(1, 0, false), 1_000_000_000);
		assert_eq!(extension_enum_value(2, 3, false), 1_000_001_003);
		assert_eq!(extension_enum_value(70, 0, true), -1_000_069_000);
	}

	#[test]
	fn evaluates_dependency_expressions() {
		let enabled = ["A", "B"].iter().map(|v| v.to_string()).collect::<HashSet<_>>();
		assert!(depends_satisfied("A", &enabled));
		assert!(!depends_satisfied("C", &enabled));
		assert!(depends_satisfied("A+B", &enabled));
		assert!(!depends_satisfied("A+C", &enabled));
		assert!(depends_satisfied("C,A", &enabled));
		assert!(depends_satisfied("(C,A)+B", &enabled));
		assert!(!depends_satisfied("(C,D)+B", &enabled));
		assert!(depends_satisfied("C,A+B", &enabled));
		assert!(!depends_satisfied("A,C+D", &enabled));
		assert!(depends_satisfied("C+D,(B)", &enabled));
	}

	#[test]
	fn links_extension_dependencies() {
		let graph = graph();
		assert!(has_parent(&graph, "VK_KHR_swapchain", "VK_KHR_surface"));
		assert!(has_parent(&graph, "VK_KHR_xlib_surface", "xlib"));
		assert!(has_parent(&graph, "VK_KHR_device_group", "VK_KHR_get_physical_device_properties2"));
		assert!(has_parent(&graph, "VK_KHR_device_group", "VK_KHR_surface"));
		assert!(has_parent(&graph, "VK_EXT_any_depends", "VK_KHR_swapchain"));
		assert!(!has_parent(&graph, "VK_EXT_any_depends", "VK_KHR_surface"));
		assert!(graph.get("VK_EXT_complex_depends").unwrap().parents.is_empty());
	}

	#[test]
	fn rejects_conflicting_redefinitions() {
		let mut registry = registry();
		let mut ty = registry.types.iter().find(|v| v.name == "VkFlags").unwrap().clone();
		registry.types.push(ty.clone());
		assert!(RegistryGraph::build(&registry, ENABLED).is_ok());

		ty.raw.push('*');
		registry.types.push(ty);
		assert!(matches!(RegistryGraph::build(&registry, ENABLED), Err(Error::Redefined(name)) if name == "VkFlags"));
	}

	#[test]
	fn orders_dependencies_first() {
		let graph = graph();
		let order = graph.emission_order(ENABLED);
		let position = |name: &str| order.iter()
			.position(|v| *v == id(&graph, name))
			.unwrap_or_else(|| panic!("`{}` was not collected", name));

		assert!(position("VkInstance") < position("VkPhysicalDevice"));
		assert!(position("VkPhysicalDevice") < position("VkDevice"));
		assert!(position("VkDevice") < position("VkQueue"));
		assert!(position("VkDeviceQueueCreateInfo") < position("VkDeviceCreateInfo"));
		assert!(position("VkDeviceCreateInfo") < position("vkCreateDevice"));
		assert!(position("VkPhysicalDeviceProperties2") < position("VkPhysicalDeviceProperties2KHR"));
		assert!(position("VkQueueFlagBits") < position("VkQueueFlags"));
		assert!(position("VK_VERSION_1_0") < position("VK_VERSION_1_1"));
		assert!(position("VK_VERSION_1_1") < position("VK_KHR_surface"));

		let unique = order.iter().collect::<HashSet<_>>();
		assert_eq!(unique.len(), order.len());
		assert!(order.iter().all(|v| graph.node(*v).kind() != NodeKind::Enums));
		assert!(!order.contains(&id(&graph, "VK_KHR_xlib_surface")));
	}

	#[test]
	fn breaks_dependency_cycles() {
		let mut graph = graph();
		let (info, queue_info) = (id(&graph, "VkDeviceCreateInfo"), id(&graph, "VkDeviceQueueCreateInfo"));
		graph.add_parent(queue_info, info);
		assert!(has_parent(&graph, "VkDeviceCreateInfo", "VkDeviceQueueCreateInfo"));
		assert!(has_parent(&graph, "VkDeviceQueueCreateInfo", "VkDeviceCreateInfo"));

		let order = graph.emission_order(ENABLED);
		assert_eq!(order.iter().filter(|v| **v == info).count(), 1);
		assert_eq!(order.iter().filter(|v| **v == queue_info).count(), 1);
		assert_eq!(order.iter().collect::<HashSet<_>>().len(), order.len());
		assert!(order.contains(&id(&graph, "vkCreateDevice")));
	}

	#[test]
	fn skips_unknown_start_names() {
		let graph = graph();
		let order = graph.emission_order(&["VK_VERSION_1_0", "VK_KHR_unknown"]);
		assert_eq!(order.last().copied(), graph.lookup("VK_VERSION_1_0"));
	}
}

//! Converts markdown into an owned, mutable node tree, rewrites that tree
//! and renders it to HTML.
//!
//! [`pulldown_cmark`] yields a flat stream of [`Event`]s. The stream is folded
//! into a [`Document`] so that rewrites which move whole subtrees (e.g.,
//! promoting a leading image to a `<figure>`) can operate on siblings. The
//! tree is flattened back into events for rendering with
//! [`pulldown_cmark::html::push_html`].

use pulldown_cmark::{html, CowStr, Event, HeadingLevel, LinkType, Options, Parser, Tag, TagEnd};

/// A node in a parsed markdown [`Document`].
#[derive(Clone, Debug, PartialEq)]
pub enum Node<'a> {
    /// A container (paragraph, heading, emphasis, link, image, ...). `end` is
    /// the matching [`TagEnd`] from the event stream.
    Element {
        tag: Tag<'a>,
        end: TagEnd,
        children: Vec<Node<'a>>,
    },

    /// An image promoted out of its paragraph, with the paragraph's
    /// remaining inline content as its caption.
    Figure {
        image: Box<Node<'a>>,
        caption: Vec<Node<'a>>,
    },

    /// Any non-container event (text, code, breaks, raw HTML, ...).
    Leaf(Event<'a>),
}

/// A markdown document as a list of top-level block [`Node`]s.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Document<'a> {
    pub nodes: Vec<Node<'a>>,
}

fn options() -> Options {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_TASKLISTS);
    options
}

impl<'a> Document<'a> {
    /// Parses `markdown` into a node tree.
    pub fn parse(markdown: &'a str) -> Document<'a> {
        let mut root: Vec<Node<'a>> = Vec::new();
        let mut stack: Vec<(Tag<'a>, Vec<Node<'a>>)> = Vec::new();

        fn push<'a>(
            root: &mut Vec<Node<'a>>,
            stack: &mut [(Tag<'a>, Vec<Node<'a>>)],
            node: Node<'a>,
        ) {
            match stack.last_mut() {
                Some((_, children)) => children.push(node),
                None => root.push(node),
            }
        }

        for event in Parser::new_ext(markdown, options()) {
            match event {
                Event::Start(tag) => stack.push((tag, Vec::new())),
                Event::End(end) => {
                    // The parser always balances start and end events.
                    if let Some((tag, children)) = stack.pop() {
                        push(&mut root, &mut stack, Node::Element { tag, end, children });
                    }
                }
                event => push(&mut root, &mut stack, Node::Leaf(event)),
            }
        }
        Document { nodes: root }
    }

    /// Rewrites every paragraph that starts with an image followed by more
    /// content into a [`Node::Figure`]: the image becomes the figure and the
    /// trailing siblings (minus one soft break directly after the image)
    /// become its caption.
    pub fn rewrite_figures(&mut self) {
        rewrite_figures(&mut self.nodes);
    }

    /// The first top-level node, if any.
    pub fn first(&self) -> Option<&Node<'a>> {
        self.nodes.first()
    }

    pub fn first_mut(&mut self) -> Option<&mut Node<'a>> {
        self.nodes.first_mut()
    }

    /// Renders the document to HTML.
    pub fn into_html(self) -> String {
        let mut events = Vec::new();
        for node in self.nodes {
            node.flatten(&mut events);
        }
        let mut out = String::new();
        html::push_html(&mut out, events.into_iter());
        out
    }
}

fn rewrite_figures(nodes: &mut [Node<'_>]) {
    for node in nodes.iter_mut() {
        match node {
            Node::Element {
                tag: Tag::Paragraph,
                children,
                ..
            } if is_figure(children) => {
                *node = figure(std::mem::take(children));
                continue;
            }
            // Tight list items hold their inline content without a paragraph.
            Node::Element {
                tag: Tag::Item,
                children,
                ..
            } => {
                let inline = children.iter().take_while(|c| !c.is_block()).count();
                if is_figure(&children[..inline]) {
                    let rest = children.split_off(inline);
                    let caption = std::mem::replace(children, rest);
                    children.insert(0, figure(caption));
                }
            }
            _ => {}
        }
        if let Node::Element { children, .. } = node {
            rewrite_figures(children);
        }
    }
}

fn is_figure(inline: &[Node<'_>]) -> bool {
    inline.len() > 1 && inline[0].is_image()
}

/// Turns inline content starting with an image into a [`Node::Figure`].
fn figure(mut caption: Vec<Node<'_>>) -> Node<'_> {
    let image = caption.remove(0);
    if let Some(Node::Leaf(Event::SoftBreak)) = caption.first() {
        caption.remove(0);
    }
    Node::Figure {
        image: Box::new(image),
        caption,
    }
}

impl<'a> Node<'a> {
    fn is_block(&self) -> bool {
        match self {
            Node::Element { tag, .. } => matches!(
                tag,
                Tag::Paragraph
                    | Tag::Heading { .. }
                    | Tag::BlockQuote(_)
                    | Tag::CodeBlock(_)
                    | Tag::HtmlBlock
                    | Tag::List(_)
                    | Tag::Item
                    | Tag::Table(_)
            ),
            Node::Figure { .. } => true,
            Node::Leaf(event) => matches!(event, Event::Rule),
        }
    }

    fn is_image(&self) -> bool {
        matches!(
            self,
            Node::Element {
                tag: Tag::Image { .. },
                ..
            }
        )
    }

    /// If this node is a heading, returns its level.
    pub fn heading_level(&self) -> Option<HeadingLevel> {
        match self {
            Node::Element {
                tag: Tag::Heading { level, .. },
                ..
            } => Some(*level),
            _ => None,
        }
    }

    /// The concatenated text and inline code of the node and its
    /// descendants.
    pub fn text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            Node::Leaf(Event::Text(text)) | Node::Leaf(Event::Code(text)) => out.push_str(text),
            Node::Leaf(Event::SoftBreak) | Node::Leaf(Event::HardBreak) => out.push(' '),
            Node::Leaf(_) => {}
            Node::Element { children, .. } => {
                children.iter().for_each(|c| c.collect_text(out));
            }
            Node::Figure { image, caption } => {
                image.collect_text(out);
                caption.iter().for_each(|c| c.collect_text(out));
            }
        }
    }

    /// Sets the `id` attribute of a heading and wraps its content in a link
    /// to `href`. Links already inside the heading are replaced by their
    /// content, as anchors can't nest. Does nothing for other nodes.
    pub fn anchor_heading(&mut self, id: &str, href: &str) {
        if let Node::Element {
            tag: Tag::Heading { id: heading_id, .. },
            children,
            ..
        } = self
        {
            *heading_id = Some(CowStr::from(id.to_owned()));
            let content = unwrap_links(std::mem::take(children));
            children.push(Node::Element {
                tag: Tag::Link {
                    link_type: LinkType::Inline,
                    dest_url: CowStr::from(href.to_owned()),
                    title: CowStr::Borrowed(""),
                    id: CowStr::Borrowed(""),
                },
                end: TagEnd::Link,
                children: content,
            });
        }
    }

    fn flatten(self, events: &mut Vec<Event<'a>>) {
        match self {
            Node::Element { tag, end, children } => {
                events.push(Event::Start(tag));
                for child in children {
                    child.flatten(events);
                }
                events.push(Event::End(end));
            }
            Node::Figure { image, caption } => {
                events.push(Event::Html(CowStr::Borrowed("<figure>\n")));
                image.flatten(events);
                events.push(Event::Html(CowStr::Borrowed("\n<figcaption>")));
                for child in caption {
                    child.flatten(events);
                }
                events.push(Event::Html(CowStr::Borrowed("</figcaption>\n</figure>\n")));
            }
            Node::Leaf(event) => events.push(event),
        }
    }
}

fn unwrap_links(nodes: Vec<Node<'_>>) -> Vec<Node<'_>> {
    let mut out = Vec::with_capacity(nodes.len());
    for node in nodes {
        match node {
            Node::Element {
                tag: Tag::Link { .. },
                children,
                ..
            } => out.extend(unwrap_links(children)),
            Node::Element { tag, end, children } => out.push(Node::Element {
                tag,
                end,
                children: unwrap_links(children),
            }),
            other => out.push(other),
        }
    }
    out
}

/// Parses, rewrites, and renders `markdown` in one go.
pub fn to_html(markdown: &str) -> String {
    let mut document = Document::parse(markdown);
    document.rewrite_figures();
    document.into_html()
}

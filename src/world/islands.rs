//! Island construction.
//!
//! An island is a maximal set of bodies connected through joints and
//! contacts. Islands share no bodies that move, so each one can be solved
//! on its own (and concurrently with the others).
//!
//! Construction is a depth-first search seeded from every awake, non-static
//! body in index order. Static bodies join every island that touches them
//! but never connect two islands. Sleeping bodies reached through a
//! constraint join the island; waking them is up to the caller.

use crate::objects::{BodyState, BodyType};

/// Bodies and constraints solved together. All indices are world indices
/// into the respective collections; constraint lists are ascending.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Island {
    pub bodies: Vec<usize>,
    pub joints: Vec<usize>,
    pub contacts: Vec<usize>,
}

impl Island {
    pub fn contains_body(&self, body: usize) -> bool {
        self.bodies.contains(&body)
    }
}

#[derive(Debug, Clone, Copy)]
enum Edge {
    Joint(usize),
    Contact(usize),
}

/// Groups bodies into islands from the body pairs of joints and contacts.
///
/// Each pair is `(body_a, body_b)` as reported by
/// [`Constraint::body_a`](crate::constraints::Constraint::body_a) and
/// [`Constraint::body_b`](crate::constraints::Constraint::body_b); the
/// position in the sequence is the constraint index stored in the island.
pub fn build_islands<B, J, C>(bodies: &[B], joints: J, contacts: C) -> Vec<Island>
where
    B: BodyState,
    J: IntoIterator<Item = (Option<usize>, usize)>,
    C: IntoIterator<Item = (Option<usize>, usize)>,
{
    let count = bodies.len();
    let mut adjacency: Vec<Vec<(Edge, Option<usize>)>> = vec![Vec::new(); count];

    let mut link = |edge: Edge, a: Option<usize>, b: usize| match a {
        Some(a) => {
            adjacency[a].push((edge, Some(b)));
            adjacency[b].push((edge, Some(a)));
        }
        None => adjacency[b].push((edge, None)),
    };
    let mut joint_count = 0;
    for (i, (a, b)) in joints.into_iter().enumerate() {
        link(Edge::Joint(i), a, b);
        joint_count += 1;
    }
    let mut contact_count = 0;
    for (i, (a, b)) in contacts.into_iter().enumerate() {
        link(Edge::Contact(i), a, b);
        contact_count += 1;
    }

    let mut visited = vec![false; count];
    let mut joint_done = vec![false; joint_count];
    let mut contact_done = vec![false; contact_count];
    let mut islands = Vec::new();
    let mut stack = Vec::new();

    for seed in 0..count {
        if visited[seed] || !bodies[seed].is_awake() || bodies[seed].body_type() == BodyType::Static {
            continue;
        }

        let mut island = Island::default();
        visited[seed] = true;
        stack.push(seed);

        while let Some(body) = stack.pop() {
            island.bodies.push(body);
            if bodies[body].body_type() == BodyType::Static {
                continue;
            }

            for &(edge, other) in &adjacency[body] {
                let done = match edge {
                    Edge::Joint(i) => &mut joint_done[i],
                    Edge::Contact(i) => &mut contact_done[i],
                };
                if *done {
                    continue;
                }
                *done = true;
                match edge {
                    Edge::Joint(i) => island.joints.push(i),
                    Edge::Contact(i) => island.contacts.push(i),
                }

                if let Some(other) = other {
                    if !visited[other] {
                        visited[other] = true;
                        stack.push(other);
                    }
                }
            }
        }

        // Statics may belong to several islands.
        for &body in &island.bodies {
            if bodies[body].body_type() == BodyType::Static {
                visited[body] = false;
            }
        }
        island.joints.sort_unstable();
        island.contacts.sort_unstable();
        islands.push(island);
    }

    islands
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraints::{Constraint, Joint, JointDef, MouseJointDef, PinJointDef};
    use crate::math::Vec2;
    use crate::objects::RigidBody;

    type Pair = (Option<usize>, usize);

    fn pairs(joints: &[Joint]) -> Vec<Pair> {
        joints.iter().map(|j| (j.body_a(), j.body_b())).collect()
    }

    fn no_contacts() -> Vec<Pair> {
        Vec::new()
    }

    fn pin(a: usize, b: usize) -> Joint {
        JointDef::from(PinJointDef::new(a, b, Vec2::ZERO, Vec2::ZERO)).build().unwrap()
    }

    fn dynamic() -> RigidBody {
        RigidBody::new_dynamic(1.0, 1.0)
    }

    #[test]
    fn test_disconnected_chains_form_separate_islands() {
        let bodies = vec![dynamic(); 5];
        let joints = vec![pin(0, 1), pin(1, 2), pin(3, 4)];
        let islands = build_islands(&bodies, pairs(&joints), no_contacts());

        assert_eq!(islands.len(), 2);
        assert_eq!(islands[0].joints, vec![0, 1]);
        assert!(islands[0].contains_body(2));
        assert_eq!(islands[1].joints, vec![2]);
        assert_eq!(islands[1].bodies.len(), 2);
    }

    #[test]
    fn test_static_bodies_do_not_merge_islands() {
        let bodies = vec![RigidBody::new_static(Vec2::ZERO, 0.0), dynamic(), dynamic()];
        let joints = vec![pin(0, 1), pin(0, 2)];
        let islands = build_islands(&bodies, pairs(&joints), no_contacts());

        assert_eq!(islands.len(), 2);
        assert!(islands.iter().all(|island| island.contains_body(0)));
        assert_eq!(islands[0].joints, vec![0]);
        assert_eq!(islands[1].joints, vec![1]);
    }

    #[test]
    fn test_sleeping_bodies_join_through_constraints() {
        let mut bodies = vec![dynamic(), dynamic(), dynamic()];
        bodies[1].set_awake(false);
        bodies[2].set_awake(false);
        let joints = vec![pin(0, 1)];
        let islands = build_islands(&bodies, pairs(&joints), no_contacts());

        assert_eq!(islands.len(), 1);
        assert!(islands[0].contains_body(1));
        // Building is a pure query.
        assert!(!bodies[1].is_awake());
        // Body 2 is asleep and unconnected, so it is not simulated.
        assert!(!islands[0].contains_body(2));
    }

    #[test]
    fn test_contacts_link_bodies() {
        let bodies = vec![dynamic(), dynamic(), dynamic()];
        let contacts: Vec<Pair> = vec![(Some(2), 1)];
        let islands = build_islands(&bodies, no_contacts(), contacts);

        assert_eq!(islands.len(), 2);
        assert_eq!(islands[0].bodies, vec![0]);
        assert!(islands[1].contains_body(1) && islands[1].contains_body(2));
        assert_eq!(islands[1].contacts, vec![0]);
    }

    #[test]
    fn test_single_body_constraints_and_lone_bodies() {
        let bodies = vec![dynamic(), dynamic()];
        let joints = vec![JointDef::from(MouseJointDef::new(1, Vec2::X)).build().unwrap()];
        let islands = build_islands(&bodies, pairs(&joints), no_contacts());

        assert_eq!(islands.len(), 2);
        assert!(islands[0].joints.is_empty());
        assert_eq!(islands[1].bodies, vec![1]);
        assert_eq!(islands[1].joints, vec![0]);
    }
}

use super::{Vibe, VibeDefinition};

/// Ordered exactly as `Vibe::ALL`; `Vibe::definition` indexes into it.
pub(super) static CATALOG: [VibeDefinition; Vibe::COUNT] = [
    VibeDefinition {
        vibe: Vibe::Bohemian,
        tagline: "free-spirited, layered and collected over time",
        keywords: &[
            "bohemian",
            "boho",
            "eclectic",
            "global",
            "macrame",
            "rattan",
            "layered textiles",
            "vintage finds",
            "artsy",
            "hanging plants",
        ],
        visual_cues: &[
            "patterned rugs",
            "floor cushions",
            "hanging plants",
            "woven baskets",
            "warm earthy tones",
            "layered throws",
        ],
        psychology: &["free-spirited", "creative", "collected over time"],
        design_principles: &[
            "layer pattern and texture freely",
            "mix vintage and handmade pieces",
            "keep the palette warm and earthy",
        ],
        furniture: &[
            "low rattan lounge chair",
            "tufted floor pouf",
            "carved wood side table",
            "macrame wall hanging",
        ],
        staging_do: &[
            "layer textiles on every seat",
            "use abundant potted plants at varied heights",
        ],
        staging_dont: &[
            "block walkways with floor seating",
            "cover windows with heavy fabric",
        ],
        forbidden_changes: &[
            "painted murals on walls",
            "arched doorways added",
            "new wood paneling",
        ],
    },
    VibeDefinition {
        vibe: Vibe::Classicist,
        tagline: "timeless, symmetrical and quietly formal",
        keywords: &[
            "classic",
            "traditional",
            "timeless",
            "crown molding",
            "wainscoting",
            "symmetry",
            "formal",
            "elegant",
            "fireplace mantel",
            "chandelier",
        ],
        visual_cues: &[
            "symmetrical furniture arrangement",
            "rolled-arm sofa",
            "brass accents",
            "framed oil paintings",
            "damask pillows",
            "tailored drapery",
        ],
        psychology: &["stable", "refined", "rooted in heritage"],
        design_principles: &[
            "arrange furniture symmetrically around a focal point",
            "favor rich wood tones and tailored upholstery",
            "use a restrained, harmonious palette",
        ],
        furniture: &[
            "rolled-arm sofa",
            "pair of wingback chairs",
            "mahogany coffee table",
            "brass table lamps",
        ],
        staging_do: &[
            "anchor seating with a large traditional rug",
            "mirror accessories on either side of the focal point",
        ],
        staging_dont: &[
            "mix more than two wood tones",
            "use trendy novelty decor",
        ],
        forbidden_changes: &[
            "added crown molding",
            "new wainscoting",
            "coffered ceiling added",
            "new fireplace",
        ],
    },
    VibeDefinition {
        vibe: Vibe::Coastal,
        tagline: "breezy, bright and relaxed",
        keywords: &[
            "coastal",
            "beach",
            "ocean view",
            "nautical",
            "breezy",
            "light-filled",
            "shiplap",
            "seaside",
            "sandy",
            "linen",
        ],
        visual_cues: &[
            "crisp white and sea-blue palette",
            "linen slipcovers",
            "driftwood accents",
            "jute rug",
            "striped throw pillows",
            "woven seagrass baskets",
        ],
        psychology: &["relaxed", "airy", "vacation at home"],
        design_principles: &[
            "keep the room bright and uncluttered",
            "pair whites with soft blues and sandy neutrals",
            "use natural, weathered textures",
        ],
        furniture: &[
            "slipcovered sofa",
            "whitewashed coffee table",
            "rattan accent chair",
            "ceramic table lamps",
        ],
        staging_do: &[
            "keep window treatments sheer",
            "add a single oversized coastal artwork",
        ],
        staging_dont: &[
            "use literal anchors and seashell kitsch",
            "introduce dark heavy furniture",
        ],
        forbidden_changes: &[
            "added shiplap walls",
            "new french doors",
            "enlarged windows",
            "beadboard ceiling added",
        ],
    },
    VibeDefinition {
        vibe: Vibe::Industrialist,
        tagline: "urban, raw and confidently unpolished",
        keywords: &[
            "industrial",
            "loft",
            "exposed brick",
            "exposed ductwork",
            "concrete floors",
            "steel beams",
            "warehouse",
            "metal",
            "edison bulb",
            "raw",
        ],
        visual_cues: &[
            "black metal accents",
            "distressed leather",
            "reclaimed wood surfaces",
            "edison bulb floor lamps",
            "charcoal and cognac palette",
        ],
        psychology: &["urban", "authentic", "unpolished confidence"],
        design_principles: &[
            "contrast raw metal with warm wood and leather",
            "keep silhouettes utilitarian",
            "favor a dark, moody palette",
        ],
        furniture: &[
            "distressed leather sofa",
            "reclaimed wood coffee table",
            "metal-frame shelving unit",
            "tripod floor lamp",
        ],
        staging_do: &[
            "use freestanding metal shelving for display",
            "keep accessories few and functional",
        ],
        staging_dont: &[
            "soften the room with pastel textiles",
            "hide existing materials behind decor",
        ],
        forbidden_changes: &[
            "exposed brick added",
            "exposed ductwork added",
            "concrete floors poured",
            "steel beams added",
        ],
    },
    VibeDefinition {
        vibe: Vibe::Maximalist,
        tagline: "bold, saturated and joyfully abundant",
        keywords: &[
            "maximalist",
            "bold",
            "colorful",
            "statement",
            "jewel tones",
            "gallery wall",
            "pattern",
            "velvet",
            "dramatic",
            "collector",
        ],
        visual_cues: &[
            "jewel-toned velvet upholstery",
            "layered patterned pillows",
            "curated gallery of framed art",
            "statement lighting",
            "stacked books and objects",
        ],
        psychology: &["expressive", "confident", "joyful abundance"],
        design_principles: &[
            "commit to saturated color",
            "mix patterns at different scales",
            "curate collections as focal points",
        ],
        furniture: &[
            "velvet chesterfield sofa",
            "lacquered side tables",
            "sculptural accent chair",
            "tasseled floor lamp",
        ],
        staging_do: &[
            "group art in a dense salon arrangement on easels and consoles",
            "repeat one accent color across the room",
        ],
        staging_dont: &[
            "leave surfaces bare",
            "let pattern clash without a shared color",
        ],
        forbidden_changes: &[
            "wallpapered walls",
            "painted ceiling",
            "new built-in bookcases",
            "changed wall color",
        ],
    },
    VibeDefinition {
        vibe: Vibe::Minimalist,
        tagline: "calm, uncluttered and intentional",
        keywords: &[
            "minimalist",
            "minimal",
            "clean lines",
            "uncluttered",
            "simple",
            "neutral palette",
            "open space",
            "calm",
            "understated",
            "zen",
        ],
        visual_cues: &[
            "clean lines",
            "neutral palette",
            "negative space",
            "low-profile furniture",
            "matte finishes",
            "a single sculptural accent",
        ],
        psychology: &["calm", "focused", "intentional"],
        design_principles: &[
            "less is more: keep only essential pieces",
            "let negative space breathe",
            "stick to a tight neutral palette",
        ],
        furniture: &[
            "low-profile sofa",
            "simple oak coffee table",
            "slim floor lamp",
            "one large abstract print",
        ],
        staging_do: &[
            "leave at least one wall bare",
            "limit accessories to three per surface",
        ],
        staging_dont: &[
            "add visual clutter",
            "use busy patterns",
        ],
        forbidden_changes: &[
            "removed walls",
            "hidden doors",
            "flush cabinetry added",
            "new recessed lighting",
        ],
    },
    VibeDefinition {
        vibe: Vibe::Modernist,
        tagline: "optimistic, sleek and mid-century at heart",
        keywords: &[
            "modern",
            "mid-century",
            "mid century",
            "contemporary",
            "sleek",
            "geometric",
            "walnut",
            "iconic",
            "retro",
            "tapered legs",
        ],
        visual_cues: &[
            "tapered wooden legs",
            "walnut and brass finishes",
            "geometric patterns",
            "mustard and teal accents",
            "sculptural arc lamp",
        ],
        psychology: &["optimistic", "design-literate", "effortlessly stylish"],
        design_principles: &[
            "favor organic curves and clean geometry",
            "mix warm walnut with pops of color",
            "keep furniture raised on slim legs",
        ],
        furniture: &[
            "mid-century walnut sofa",
            "molded lounge chair",
            "tulip side table",
            "arc floor lamp",
        ],
        staging_do: &[
            "float the sofa on a geometric rug",
            "use one iconic accent chair as a focal point",
        ],
        staging_dont: &[
            "overload with reproduction pieces",
            "use heavy skirted upholstery",
        ],
        forbidden_changes: &[
            "new floor-to-ceiling windows",
            "open floor plan created",
            "new sliding glass doors",
            "clerestory windows added",
        ],
    },
    VibeDefinition {
        vibe: Vibe::Naturalist,
        tagline: "grounded, organic and restorative",
        keywords: &[
            "natural",
            "organic",
            "biophilic",
            "wood",
            "stone",
            "earthy",
            "greenery",
            "sunlight",
            "sustainable",
            "cabin",
        ],
        visual_cues: &[
            "live-edge wood",
            "stone and clay accents",
            "lush potted plants",
            "linen and wool textiles",
            "muted greens and earth tones",
        ],
        psychology: &["grounded", "restorative", "connected to nature"],
        design_principles: &[
            "bring the outdoors in with plants",
            "favor raw natural materials",
            "keep tones soft and earthy",
        ],
        furniture: &[
            "live-edge wood coffee table",
            "linen sofa",
            "woven jute rug",
            "stoneware planters",
        ],
        staging_do: &[
            "place plants where daylight already falls",
            "use organic shapes for accessories",
        ],
        staging_dont: &[
            "use glossy synthetic finishes",
            "crowd windows with tall plants",
        ],
        forbidden_changes: &[
            "added skylights",
            "new stone accent wall",
            "wood beams added to ceiling",
            "new picture windows",
        ],
    },
];
